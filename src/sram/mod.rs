/* Microchip 23x640 serial SRAM: 8 KiB (64 Kbit), byte-addressable over SPI */

/* Chip documentation: http://ww1.microchip.com/downloads/en/DeviceDoc/22126E.pdf */

use crate::spi::SpiBus;

#[allow(dead_code)]
mod consts {
	// instruction set
	pub const WRITE_OPCODE: u8 = 0x02; // write data
	pub const READ_OPCODE:  u8 = 0x03; // read data
	pub const WRMR_OPCODE:  u8 = 0x01; // write mode register ("WRSR")
	pub const RDMR_OPCODE:  u8 = 0x05; // read mode register ("RDSR")

	// mode register bits [7:6]; remaining bits are reserved except
	// bit 0 (HOLD disable), which we leave alone
	pub const MODE_BYTE:       u8 = 0b00_000000;
	pub const MODE_SEQUENTIAL: u8 = 0b01_000000;
	pub const MODE_PAGE:       u8 = 0b10_000000;
	pub const MODE_MASK:       u8 = 0b11_000000;
}

use self::consts::*;

/// Highest valid byte offset.
pub const MAX_ADDRESS: u16 = 0x1fff;
pub const MEMORY_SIZE: usize = MAX_ADDRESS as usize + 1;

/// One open chip. Owns the bus handle; dropping the session closes the
/// underlying device.
pub struct Session<B: SpiBus> {
	bus: B,
}

impl<B: SpiBus> Session<B> {
	/// Put the chip in byte operating mode and verify the mode register
	/// readback; single-byte READ/WRITE frames are only valid in byte mode.
	pub fn open(mut bus: B) -> crate::AResult<Session<B>> {
		let mut rx = [0u8; 2];
		bus.transfer(&[WRMR_OPCODE, MODE_BYTE], &mut rx)?;
		bus.transfer(&[RDMR_OPCODE, 0x00], &mut rx)?;
		ensure!(
			rx[1] & MODE_MASK == MODE_BYTE,
			"chip didn't enter byte mode (mode register: 0x{:02x})",
			rx[1]
		);

		Ok(Session { bus })
	}

	/// Read frame: opcode, 16-bit address (two bits of don't care on top),
	/// one dummy byte clocking the data out.
	pub fn read_byte(&mut self, address: u16) -> crate::AResult<u8> {
		ensure!(
			address <= MAX_ADDRESS,
			"address 0x{:04x} beyond end of memory (max 0x{:04x})",
			address, MAX_ADDRESS
		);

		let tx = [READ_OPCODE, (address >> 8) as u8, address as u8, 0x00];
		let mut rx = [0u8; 4];
		self.bus.transfer(&tx, &mut rx)?;
		Ok(rx[3])
	}

	// not used when dumping; kept for bench verification of a chip
	pub fn write_byte(&mut self, address: u16, data: u8) -> crate::AResult<()> {
		ensure!(
			address <= MAX_ADDRESS,
			"address 0x{:04x} beyond end of memory (max 0x{:04x})",
			address, MAX_ADDRESS
		);

		let tx = [WRITE_OPCODE, (address >> 8) as u8, address as u8, data];
		let mut rx = [0u8; 4];
		self.bus.transfer(&tx, &mut rx)?;
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use std::io;

	// records frames and plays back scripted responses
	struct ScriptedBus {
		sent: Vec<Vec<u8>>,
		responses: Vec<Vec<u8>>,
	}

	impl ScriptedBus {
		fn new(responses: Vec<Vec<u8>>) -> ScriptedBus {
			ScriptedBus {
				sent: Vec::new(),
				responses,
			}
		}
	}

	impl SpiBus for ScriptedBus {
		fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> io::Result<()> {
			assert_eq!(tx.len(), rx.len());
			self.sent.push(tx.to_vec());
			let response = self.responses.remove(0);
			assert_eq!(response.len(), rx.len());
			rx.copy_from_slice(&response);
			Ok(())
		}

		fn speed_hz(&self) -> u32 {
			5_000_000
		}
	}

	#[test]
	fn open_sets_byte_mode() {
		let bus = ScriptedBus::new(vec![
			vec![0x00, 0x00],       // WRMR echo, ignored
			vec![0x00, MODE_BYTE],  // RDMR readback
		]);
		let session = Session::open(bus).expect("open failed");
		assert_eq!(session.bus.sent[0], vec![WRMR_OPCODE, MODE_BYTE]);
		assert_eq!(session.bus.sent[1], vec![RDMR_OPCODE, 0x00]);
	}

	#[test]
	fn open_rejects_wrong_mode_readback() {
		let bus = ScriptedBus::new(vec![
			vec![0x00, 0x00],
			vec![0x00, MODE_SEQUENTIAL],
		]);
		assert!(Session::open(bus).is_err());
	}

	fn opened(extra_responses: Vec<Vec<u8>>) -> Session<ScriptedBus> {
		let mut responses = vec![
			vec![0x00, 0x00],
			vec![0x00, MODE_BYTE],
		];
		responses.extend(extra_responses);
		Session::open(ScriptedBus::new(responses)).expect("open failed")
	}

	#[test]
	fn read_byte_frame() {
		let mut session = opened(vec![
			vec![0x00, 0x00, 0x00, 0xa5],
		]);
		let data = session.read_byte(0x1234).expect("read failed");
		assert_eq!(data, 0xa5);
		assert_eq!(session.bus.sent[2], vec![READ_OPCODE, 0x12, 0x34, 0x00]);
	}

	#[test]
	fn write_byte_frame() {
		let mut session = opened(vec![
			vec![0x00, 0x00, 0x00, 0x00],
		]);
		session.write_byte(0x1fff, 0x5a).expect("write failed");
		assert_eq!(session.bus.sent[2], vec![WRITE_OPCODE, 0x1f, 0xff, 0x5a]);
	}

	#[test]
	fn rejects_address_beyond_memory() {
		let mut session = opened(vec![]);
		assert!(session.read_byte(MAX_ADDRESS + 1).is_err());
		assert!(session.write_byte(0x2000, 0x00).is_err());
	}
}
