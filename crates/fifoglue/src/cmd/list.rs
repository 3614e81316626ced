use fifoglue_endpoint::Registry;

use crate::cmd::ListArgs;
use crate::exit::{endpoint_error, CliResult, SUCCESS};
use crate::output::{print_endpoints, OutputFormat};

pub fn run(_args: ListArgs, registry: &Registry, format: OutputFormat) -> CliResult<i32> {
    let names = registry
        .endpoints()
        .map_err(|err| endpoint_error("list failed", err))?;
    let namespace = registry.config().dir.display().to_string();
    print_endpoints(&names, &namespace, format);
    Ok(SUCCESS)
}
