use std::io;

mod spidev;

use crate::spi::SpiBus;

/// Open a spidev node (`/dev/spidevB.C`) and configure it for the 23x640:
/// SPI mode 0, 8 bits per word, `clock_hz` max transfer speed.
///
/// Each chip select line of a bus is a separate spidev node, so "which
/// physical chip" is entirely encoded in the path.
pub fn open_device(path: &str, clock_hz: u32) -> io::Result<impl SpiBus> {
	spidev::inner_open(path, clock_hz)
}
