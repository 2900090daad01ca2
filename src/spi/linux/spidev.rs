use std::ffi::CString;
use std::fs;
use std::io;
use std::mem;
use std::os::unix::io::{
	AsRawFd,
	FromRawFd,
};

use libc::{
	O_CLOEXEC,
	O_RDWR,
	c_ulong,
	c_void,
	ioctl,
	open,
};

use crate::spi::SpiBus;

/* ioctl interface from <linux/spi/spidev.h> */

const IOC_WRITE: u32 = 1;
const SPI_IOC_MAGIC: u32 = 'k' as u32;

const fn spi_ioc(dir: u32, nr: u32, size: u32) -> u32 {
	(dir << 30) | (size << 16) | (SPI_IOC_MAGIC << 8) | nr
}

const SPI_IOC_WR_MODE: u32 = spi_ioc(IOC_WRITE, 1, 1);
const SPI_IOC_WR_BITS_PER_WORD: u32 = spi_ioc(IOC_WRITE, 3, 1);
const SPI_IOC_WR_MAX_SPEED_HZ: u32 = spi_ioc(IOC_WRITE, 4, 4);

const fn spi_ioc_message(n: u32) -> u32 {
	spi_ioc(IOC_WRITE, 0, n * (mem::size_of::<SpiIocTransfer>() as u32))
}

// CPOL 0, CPHA 0; the only mode the 23x640 speaks
const SPI_MODE_0: u8 = 0x00;

const BITS_PER_WORD: u8 = 8;

#[derive(Default)]
#[repr(C)]
struct SpiIocTransfer {
	tx_buf: u64,
	rx_buf: u64,
	len: u32,
	speed_hz: u32,
	delay_usecs: u16,
	bits_per_word: u8,
	cs_change: u8,
	tx_nbits: u8,
	rx_nbits: u8,
	pad: u16,
}

pub struct Spidev {
	file: fs::File,
	speed_hz: u32,
}

fn ioctl_write(file: &fs::File, request: u32, data: *const c_void) -> io::Result<()> {
	let res = unsafe { ioctl(file.as_raw_fd(), request as c_ulong, data) };
	if -1 == res {
		return Err(io::Error::last_os_error());
	}
	Ok(())
}

impl SpiBus for Spidev {
	fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> io::Result<()> {
		assert_eq!(tx.len(), rx.len());
		assert!(tx.len() <= u32::max_value() as usize);

		let xfer = SpiIocTransfer {
			tx_buf: tx.as_ptr() as usize as u64,
			rx_buf: rx.as_mut_ptr() as usize as u64,
			len: tx.len() as u32,
			speed_hz: self.speed_hz,
			bits_per_word: BITS_PER_WORD,
			..Default::default()
		};

		let res = unsafe {
			ioctl(
				self.file.as_raw_fd(),
				spi_ioc_message(1) as c_ulong,
				&xfer as *const SpiIocTransfer,
			)
		};
		if -1 == res {
			return Err(io::Error::last_os_error());
		}
		Ok(())
	}

	fn speed_hz(&self) -> u32 {
		self.speed_hz
	}
}

pub fn inner_open(path: &str, clock_hz: u32) -> io::Result<Spidev> {
	let cpath = CString::new(path)?;

	let fd = unsafe { open(cpath.as_ptr(), O_RDWR | O_CLOEXEC) };
	if -1 == fd {
		return Err(io::Error::last_os_error());
	}
	// now get fd managed to prevent resource leak
	let file = unsafe { fs::File::from_raw_fd(fd) };

	ioctl_write(&file, SPI_IOC_WR_MODE, &SPI_MODE_0 as *const u8 as *const c_void)?;
	ioctl_write(&file, SPI_IOC_WR_BITS_PER_WORD, &BITS_PER_WORD as *const u8 as *const c_void)?;
	ioctl_write(&file, SPI_IOC_WR_MAX_SPEED_HZ, &clock_hz as *const u32 as *const c_void)?;

	Ok(Spidev {
		file,
		speed_hz: clock_hz,
	})
}

#[cfg(test)]
mod test {
	use super::*;

	// request numbers as expanded from <linux/spi/spidev.h> on a 64-bit target
	#[test]
	fn ioctl_request_values() {
		assert_eq!(SPI_IOC_WR_MODE, 0x4001_6b01);
		assert_eq!(SPI_IOC_WR_BITS_PER_WORD, 0x4001_6b03);
		assert_eq!(SPI_IOC_WR_MAX_SPEED_HZ, 0x4004_6b04);
		assert_eq!(spi_ioc_message(1), 0x4020_6b00);
		assert_eq!(spi_ioc_message(2), 0x4040_6b00);
	}

	#[test]
	fn transfer_struct_matches_kernel_layout() {
		assert_eq!(mem::size_of::<SpiIocTransfer>(), 32);
	}

	#[test]
	fn open_missing_device_fails() {
		assert!(inner_open("/dev/spidev-does-not-exist", 5_000_000).is_err());
	}
}
