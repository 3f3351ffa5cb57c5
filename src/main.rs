use std::process::ExitCode;

fn main() -> ExitCode {
    match nyt_covid_charts::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
