use fifoglue_endpoint::Registry;

use crate::cmd::UnregisterArgs;
use crate::exit::{endpoint_error, CliResult, SUCCESS};

pub fn run(args: UnregisterArgs, registry: &Registry) -> CliResult<i32> {
    registry
        .unregister(&args.name)
        .map_err(|err| endpoint_error("unregister failed", err))?;
    Ok(SUCCESS)
}
