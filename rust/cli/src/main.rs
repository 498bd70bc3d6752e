use partydeck_server::{LogFormat, init_logging};
use std::io;

fn main() {
    let format = match std::env::var("PARTYDECK_LOG_FORMAT").as_deref() {
        Ok("json") => LogFormat::Json,
        _ => LogFormat::Pretty,
    };
    if let Err(e) = init_logging(format) {
        eprintln!("partydeck: warning: logging disabled: {}", e);
    }

    let code = partydeck_cli::run(std::env::args(), &mut io::stdout(), &mut io::stderr());
    std::process::exit(code);
}
