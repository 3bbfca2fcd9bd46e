fn main() -> std::process::ExitCode {
    chatmate_lib::run()
}
