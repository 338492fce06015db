fn main() -> std::process::ExitCode {
    tdroiddesk::run()
}
