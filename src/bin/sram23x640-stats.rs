#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate sram23x640_dump;
use sram23x640_dump::*;

use std::fs;
use std::io;
use std::path::Path;
use std::process::exit;

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
		(@arg blocks: -b --blocks +takes_value "Single block count (perfect square, >= 4); default sweeps i*i for i in 2..=20")
		(@arg invert_band: --("invert-band") "Invert the banded middle section of the cell array before computing statistics")
		(@arg outdir: -d --("out-dir") +takes_value "Directory for the stats CSV files (default: TRAINING_DATA)")
		(@arg INPUT: +required "Dump CSV file (Address,Word) to analyze")
	).get_matches();

	let input: String = get_param(&matches, "INPUT")?;
	let out_dir = Path::new(matches.value_of("outdir").unwrap_or("TRAINING_DATA"));

	let file = match fs::File::open(&input) {
		Ok(f) => f,
		Err(e) => bail!("failed to open {}: {}", input, e),
	};
	let mut bits = stats::read_dump(io::BufReader::new(file))?;
	info!("{}: {} bits", input, bits.len());
	if bits.len() != stats::CHIP_BITS {
		warn!(
			"{}: expected a single-chip dump ({} bits), got {}; block geometry assumes a 256x256 array",
			input, stats::CHIP_BITS, bits.len()
		);
	}

	if matches.is_present("invert_band") {
		stats::invert_banding(&mut bits);
	}

	if let Err(e) = fs::create_dir_all(out_dir) {
		bail!("failed to create {}: {}", out_dir.display(), e);
	}

	let block_counts: Vec<usize> = if matches.is_present("blocks") {
		vec![get_param(&matches, "blocks")?]
	} else {
		(2..=20).map(|i| i * i).collect()
	};

	let stem = match Path::new(&input).file_stem() {
		Some(s) => s.to_string_lossy().into_owned(),
		None => bail!("can't derive an output name from {}", input),
	};

	for num_blocks in block_counts {
		let block_stats = stats::block_stats(&bits, num_blocks)?;
		let path = out_dir.join(format!("{}Stats{}Blocks.csv", stem, block_stats.num_blocks));
		let mut file = match fs::File::create(&path) {
			Ok(f) => f,
			Err(e) => bail!("failed to create {}: {}", path.display(), e),
		};
		stats::write_stats_csv(&mut file, &block_stats)?;
		info!("wrote {}", path.display());
	}

	Ok(())
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
