use std::fs;
use std::io::{
	BufWriter,
	Write,
};
use std::path::PathBuf;

use crate::spi::{
	self,
	SpiBus,
};
use crate::sram::{
	MAX_ADDRESS,
	Session,
};

pub const CSV_HEADER: &str = "Address,Word";

/// The original tool compiled these in; now they are explicit. The default
/// matches the original exactly: two chips on bus 0, 5 MHz, `test.csv`.
pub struct DumpConfig {
	pub output: PathBuf,
	pub clock_hz: u32,
	pub devices: Vec<String>,
}

impl Default for DumpConfig {
	fn default() -> Self {
		DumpConfig {
			output: PathBuf::from("test.csv"),
			clock_hz: 5_000_000,
			devices: vec![
				"/dev/spidev0.0".to_string(),
				"/dev/spidev0.1".to_string(),
			],
		}
	}
}

/// One full pass over a chip: every address in ascending order, one
/// `aaaa,dd` row per byte (4 hex digit address, 2 hex digit value).
pub fn dump_chip<B, W>(session: &mut Session<B>, target: &mut W) -> crate::AResult<()>
where
	B: SpiBus,
	W: Write,
{
	for address in 0..=MAX_ADDRESS {
		let data = session.read_byte(address)?;
		writeln!(target, "{:04x},{:02x}", address, data)?;
	}
	Ok(())
}

pub fn run(config: &DumpConfig) -> crate::AResult<()> {
	let file = with_context!(
		("failed to open output file {}", config.output.display()),
		{ Ok(fs::File::create(&config.output)?) }
	)?;
	let mut target = BufWriter::new(file);

	writeln!(target, "{}", CSV_HEADER)?;

	// chips are read strictly one after another: a session is dropped (and
	// its device closed) before the next one is opened, so the row blocks
	// land in the file in device order
	for device in &config.devices {
		info!("reading {} at {} Hz", device, config.clock_hz);
		with_context!(("failed to dump {}", device), {
			let bus = spi::open_device(device, config.clock_hz)?;
			let mut session = Session::open(bus)?;
			dump_chip(&mut session, &mut target)
		})?;
	}

	with_context!(
		("failed to write output file {}", config.output.display()),
		{ Ok(target.flush()?) }
	)?;

	println!(
		"Done reading {} chip(s). Output file is {}.",
		config.devices.len(),
		config.output.display()
	);
	Ok(())
}
