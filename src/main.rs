use std::process::ExitCode;

fn main() -> ExitCode {
    cui2qid_lib::run()
}
