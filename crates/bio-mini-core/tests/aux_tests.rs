mod common;

use std::collections::VecDeque;
use std::convert::Infallible;

use ads1115::{DataRate, FullScale};
use bio_mini_core::AuxSensors;
use bio_mini_icd::TxMode;
use common::{HostSink, NoDelay};
use embedded_hal::i2c::{ErrorType, I2c, Operation};

#[derive(Default)]
struct MockI2c {
    reads: VecDeque<Vec<u8>>,
}

impl MockI2c {
    /// Script one conversion: a ready poll followed by the result.
    fn push_conversion(&mut self, value: i16) {
        self.reads.push_back(vec![0x80, 0x00]);
        self.reads.push_back(value.to_be_bytes().to_vec());
    }
}

impl ErrorType for MockI2c {
    type Error = Infallible;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations.iter_mut() {
            if let Operation::Read(buf) = op {
                let data = self.reads.pop_front().unwrap_or_default();
                for (dst, src) in buf.iter_mut().zip(data) {
                    *dst = src;
                }
            }
        }
        Ok(())
    }
}

#[test]
fn update_refreshes_all_four_channels() {
    let mut i2c = MockI2c::default();
    for value in [258, 772, -2, 32767] {
        i2c.push_conversion(value);
    }

    let mut aux = AuxSensors::new(i2c, ads1115::ADDR_VDD);
    aux.begin(FullScale::Fsr2V048, DataRate::Sps860);
    aux.update(&mut NoDelay).unwrap();
    assert_eq!(aux.data, [258, 772, -2, 32767]);
}

#[test]
fn raw_transmission_is_big_endian_byte_pairs() {
    let mut i2c = MockI2c::default();
    for value in [258, 772, -2, 32767] {
        i2c.push_conversion(value);
    }

    let mut aux = AuxSensors::new(i2c, ads1115::ADDR_VDD);
    aux.update(&mut NoDelay).unwrap();

    let mut host = HostSink::default();
    aux.send(&mut host.clone(), true);
    assert_eq!(
        host.take_bytes(),
        vec![0x01, 0x02, 0x03, 0x04, 0xFF, 0xFE, 0x7F, 0xFF]
    );

    // The serial-stream gate silences transmission entirely.
    aux.send(&mut host.clone(), false);
    assert!(host.take_bytes().is_empty());
}

#[test]
fn ascii_transmission_is_space_separated_decimal() {
    let mut i2c = MockI2c::default();
    for value in [258, 772, -2, 32767] {
        i2c.push_conversion(value);
    }

    let mut aux = AuxSensors::new(i2c, ads1115::ADDR_VDD);
    aux.update(&mut NoDelay).unwrap();
    aux.set_tx_mode(TxMode::Ascii);

    let mut host = HostSink::default();
    aux.send(&mut host.clone(), true);
    assert_eq!(host.take_string(), "258 772 -2 32767 ");
}
