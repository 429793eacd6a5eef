use chrono::Local;
use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// `RUST_LOG` still wins over `level` for individual modules.
pub fn init(level: LevelFilter) {
    let _ = Builder::new()
        .format(|buf, record| {
            writeln!(buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .parse_env("RUST_LOG")
        .try_init();

    log::debug!("Logger initialized at {}.", level);
}
