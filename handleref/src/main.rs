use std::process::ExitCode;

use handleref_lib::app::run;
use io_impl::RealIo;
use log::error;

fn main() -> ExitCode {
    env_logger::init();
    match run(&RealIo()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
