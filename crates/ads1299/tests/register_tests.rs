use ads1299::{
    BiasSensP, ChSet, Config1, Config2, Config3, Gain, Id, Loff, Misc1, Mux,
    Register, SampleRate,
};

#[test]
fn config1_data_rate_field_round_trips() {
    let reg = Config1::default();
    assert_eq!(reg.bits(), 0x96);
    assert_eq!(reg.sample_rate().unwrap(), SampleRate::Sps250);

    let reg = reg.with_sample_rate(SampleRate::KSps16);
    assert_eq!(reg.bits(), 0x90);
    assert_eq!(reg.sample_rate().unwrap(), SampleRate::KSps16);
}

#[test]
fn sample_rate_codes_match_protocol_digits() {
    assert_eq!(SampleRate::KSps16.code(), 0);
    assert_eq!(SampleRate::Sps250.code(), 6);
    assert_eq!(SampleRate::from_code(3).unwrap(), SampleRate::KSps2);
    assert!(SampleRate::from_code(7).is_err());
    assert_eq!(SampleRate::Sps500.label(), "500");
}

#[test]
fn chset_fields_round_trip_without_clobbering_neighbours() {
    let reg = ChSet::from_bits_retain(0x00)
        .with_pd(true)
        .with_gain(Gain::X24)
        .with_srb2(true)
        .with_mux(Mux::TestSignal);
    assert_eq!(reg.bits(), 0b1110_1101);
    assert!(reg.pd());
    assert!(reg.srb2());
    assert_eq!(reg.gain().unwrap(), Gain::X24);
    assert_eq!(reg.mux().unwrap(), Mux::TestSignal);

    // Changing one field leaves the others alone.
    let reg = reg.with_mux(Mux::Normal).with_pd(false);
    assert_eq!(reg.gain().unwrap(), Gain::X24);
    assert!(reg.srb2());
    assert_eq!(reg.bits(), 0b0110_1000);
}

#[test]
fn gain_codes_map_to_shifted_field() {
    assert_eq!(Gain::X1.code(), 0);
    assert_eq!(Gain::X24.code(), 6);
    assert!(Gain::from_code(7).is_err());
    assert_eq!(
        ChSet::from_bits_retain(0).with_gain(Gain::X12).bits(),
        0b0101_0000
    );
}

#[test]
fn config2_test_signal_composition() {
    // Internal test signal, 2x amplitude, DC: the full power-up value the
    // board writes for the DC test mode.
    let reg = Config2::default()
        .with_int_cal(true)
        .with_cal_amp(true)
        .with_cal_freq(ads1299::CalFreq::Dc);
    assert_eq!(reg.bits(), 0b1101_0111);
    assert!(reg.int_cal());
    assert!(reg.cal_amp());
    assert_eq!(reg.cal_freq(), ads1299::CalFreq::Dc);
}

#[test]
fn config3_reference_and_bias_buffers() {
    let reg = Config3::default()
        .with_pd_refbuf(true)
        .with_biasref_int(true)
        .with_pd_bias(true);
    assert_eq!(reg.bits(), 0xEC);
}

#[test]
fn loff_excitation_fields_preserve_comparator_threshold() {
    let reg = Loff::from_bits_retain(0b1010_0000)
        .with_ilead_off(ads1299::ILeadOff::_24uA)
        .with_flead_off(ads1299::FLeadOff::Ac31_2);
    assert_eq!(reg.bits(), 0b1010_1110);
    assert_eq!(reg.ilead_off(), ads1299::ILeadOff::_24uA);
    assert_eq!(reg.flead_off(), ads1299::FLeadOff::Ac31_2);
}

#[test]
fn bias_sense_channel_masks() {
    assert_eq!(BiasSensP::channel(0).bits(), 0b0000_0001);
    assert_eq!(BiasSensP::channel(7).bits(), 0b1000_0000);
}

#[test]
fn misc1_srb1_switch() {
    assert_eq!(Misc1::default().with_srb1(true).bits(), 0x20);
    assert_eq!(
        Misc1::from_bits_retain(0x20).with_srb1(false).bits(),
        0x00
    );
}

#[test]
fn id_verification() {
    // ADS1299-4: DEV_ID 0b11, NU_CH 0b00.
    let id = Id::from_bits_retain(0b0011_1100);
    assert_eq!(id.num_channels().unwrap(), 4);
    assert!(id.verify().is_ok());

    assert!(Id::from_bits_retain(0x00).verify().is_err());
    assert!(Id::from_bits_retain(0xFF).verify().is_err());
}

#[test]
fn channel_registers_are_contiguous_and_named() {
    assert_eq!(Register::from_channel_index(0), Register::CH1SET);
    assert_eq!(Register::from_channel_index(7), Register::CH8SET);
    // Out-of-range indices saturate rather than panic.
    assert_eq!(Register::from_channel_index(12), Register::CH8SET);

    for addr in 0..ads1299::NUM_REGISTERS as u8 {
        let reg = Register::from_addr(addr).unwrap();
        assert_eq!(reg.addr(), addr);
        assert!(!reg.name().is_empty());
    }
    assert!(Register::from_addr(0x18).is_none());
}
