use fifoglue_endpoint::Registry;
use fifoglue_frame::{ATOMIC_WRITE_LIMIT, SEPARATOR, SHUTDOWN_HEADER};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs, registry: &Registry) -> CliResult<i32> {
    if !args.extended {
        println!("fifoglue {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let config = registry.config();
    println!("name: fifoglue");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("FIFOGLUE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("namespace: {}", config.dir.display());
    println!(
        "frame_size: {} (atomic limit {ATOMIC_WRITE_LIMIT})",
        config.frame.frame_size()
    );
    println!("separator: {SEPARATOR:?}");
    println!("shutdown_header: {SHUTDOWN_HEADER}");
    println!("queue_capacity: {}", config.queue_capacity);
    println!("fifo_mode: {:o}", config.fifo_mode);

    Ok(SUCCESS)
}
