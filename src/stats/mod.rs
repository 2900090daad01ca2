/* Startup-state statistics over a dump, for chip fingerprinting.
 *
 * The bit stream of one 8 KiB chip is treated as a 256x256 bit image (the
 * physical cell array is 256 bits wide), carved into a square grid of square
 * blocks centered on the array, and the incidence of 1 bits is averaged per
 * block.
 */

use std::io::{
	BufRead,
	Write,
};

use crate::dump::CSV_HEADER;

/// Bits per physical row of the cell array.
pub const BIT_ROW_WIDTH: usize = 256;

/// Bit count of one full 8 KiB chip; the block geometry below assumes a
/// single-chip stream (a two-chip dump must be split first).
pub const CHIP_BITS: usize = 65536;

// the middle half of the cell array reads inverted (banding); inclusive
// bit indexes into a single chip's stream
pub const BANDING_FIRST: usize = 16384;
pub const BANDING_LAST: usize = 49150;

/// Parse an `Address,Word` dump back into a flat bit stream, 8 bits per
/// data row, most significant bit first.
pub fn read_dump<R: BufRead>(source: R) -> crate::AResult<Vec<u8>> {
	let mut bits = Vec::new();

	for (index, line) in source.lines().enumerate() {
		let line = line?;
		let line = line.trim_end();
		if 0 == index {
			ensure!(line == CSV_HEADER, "unexpected header line: {:?}", line);
			continue;
		}
		if line.is_empty() {
			continue;
		}

		let mut fields = line.splitn(2, ',');
		let (address, word) = match (fields.next(), fields.next()) {
			(Some(a), Some(w)) => (a, w),
			_ => bail!("line {}: expected \"address,word\", got {:?}", index + 1, line),
		};
		with_context!(("line {}: bad address field {:?}", index + 1, address), {
			u16::from_str_radix(address, 16)?;
			Ok(())
		})?;
		let value = with_context!(("line {}: bad value field {:?}", index + 1, word), {
			Ok(u8::from_str_radix(word, 16)?)
		})?;

		for bit in (0..8).rev() {
			bits.push((value >> bit) & 1);
		}
	}

	Ok(bits)
}

/// Invert every bit inside the banding window, leaving the rest untouched.
pub fn invert_banding(bits: &mut [u8]) {
	for (index, bit) in bits.iter_mut().enumerate() {
		if index >= BANDING_FIRST && index <= BANDING_LAST {
			*bit ^= 1;
		}
	}
}

pub struct BlockStats {
	pub num_blocks: usize,
	/// Fraction of 1 bits per block, in row-major block order.
	pub averages: Vec<f64>,
	pub mean: f64,
	/// Sample standard deviation of the block averages.
	pub stddev: f64,
}

fn isqrt(n: usize) -> usize {
	(n as f64).sqrt() as usize
}

/// Carve `num_blocks` (a perfect square, at least 4) square chunks out of
/// the bit image and average the 1 bits in each.
///
/// Chunk edge length is `floor(sqrt(len / num_blocks))` bits; the grid is
/// shifted right and down by half the leftover so the centermost cells are
/// the ones measured.
pub fn block_stats(bits: &[u8], num_blocks: usize) -> crate::AResult<BlockStats> {
	let grid = isqrt(num_blocks);
	ensure!(grid >= 2 && grid * grid == num_blocks,
		"block count must be a perfect square of at least 2x2, got {}", num_blocks);

	let chunk_size = isqrt(bits.len() / num_blocks);
	ensure!(chunk_size >= 1, "{} bits can't be split into {} blocks", bits.len(), num_blocks);

	let excess_bits = bits.len() - num_blocks * chunk_size * chunk_size;
	let row_size = BIT_ROW_WIDTH * chunk_size;
	let x_offset = (excess_bits / 511 + 1) / 2;
	let y_offset = x_offset * BIT_ROW_WIDTH;

	let last_start = (grid - 1) * row_size + (grid - 1) * chunk_size + x_offset + y_offset;
	ensure!(last_start + (chunk_size - 1) * BIT_ROW_WIDTH + chunk_size <= bits.len(),
		"{} blocks of {}x{} bits don't fit into {} bits", num_blocks, chunk_size, chunk_size, bits.len());

	let mut averages = Vec::with_capacity(num_blocks);
	for i in 0..grid {
		for j in 0..grid {
			let start = i * row_size + j * chunk_size + x_offset + y_offset;
			let mut ones = 0usize;
			for k in 0..chunk_size {
				let row = start + k * BIT_ROW_WIDTH;
				for bit in &bits[row..row + chunk_size] {
					ones += *bit as usize;
				}
			}
			averages.push(ones as f64 / (chunk_size * chunk_size) as f64);
		}
	}

	let mean = averages.iter().sum::<f64>() / averages.len() as f64;
	let variance = averages.iter().map(|a| (a - mean) * (a - mean)).sum::<f64>()
		/ (averages.len() - 1) as f64;

	Ok(BlockStats {
		num_blocks,
		averages,
		mean,
		stddev: variance.sqrt(),
	})
}

pub fn write_stats_csv<W: Write>(target: &mut W, stats: &BlockStats) -> crate::AResult<()> {
	writeln!(target, "Block,Percentage of 1s,Total Average,Overall Standard Deviation")?;
	for (block, average) in stats.averages.iter().enumerate() {
		writeln!(target, "{},{:.4},{:.4},{:.4}", block, average, stats.mean, stats.stddev)?;
	}
	Ok(())
}
