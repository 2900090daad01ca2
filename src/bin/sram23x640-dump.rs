#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate sram23x640_dump;
use sram23x640_dump::*;

use std::process::exit;

use sram23x640_dump::dump::DumpConfig;

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid paramater {}: {}", name, e);
		e.context(msg).into()
	})
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@arg output: -o --output +takes_value "Output CSV file (default: test.csv)")
		(@arg clock: -c --clock +takes_value "SPI clock frequency in Hz (default: 5000000)")
		(@arg DEVICE: ... "spidev node per chip, in dump order (default: /dev/spidev0.0 /dev/spidev0.1)")
	).get_matches();

	let mut config = DumpConfig::default();
	if let Some(output) = matches.value_of("output") {
		config.output = output.into();
	}
	if matches.is_present("clock") {
		config.clock_hz = get_param(&matches, "clock")?;
	}
	if let Some(devices) = matches.values_of("DEVICE") {
		config.devices = devices.map(String::from).collect();
	}
	ensure!(!config.devices.is_empty(), "need at least one device to dump");

	dump::run(&config)
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
