use crate::error::{DemuxError, Result};
use crate::utils::{BitReader, BitWriter};

/// Size of an ADTS header without CRC.
pub const ADTS_HEADER_SIZE: usize = 7;
/// Size of an ADTS header carrying a CRC word.
pub const ADTS_HEADER_SIZE_CRC: usize = 9;
/// Largest value of the 13-bit frame_length field.
pub const MAX_FRAME_LENGTH: usize = 0x1FFF;
/// PCM samples carried by one raw data block.
pub const SAMPLES_PER_FRAME: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileType {
    Main = 0,
    LC = 1,
    SSR = 2,
    LTP = 3,
}

impl From<u8> for ProfileType {
    fn from(value: u8) -> Self {
        match value & 0x3 {
            0 => ProfileType::Main,
            1 => ProfileType::LC,
            2 => ProfileType::SSR,
            _ => ProfileType::LTP,
        }
    }
}

/// Decoder-relevant subset of an ADTS header. Two frames with equal configs
/// can be fed to the same decoder instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AACConfig {
    pub profile: ProfileType,
    pub sample_rate_index: u8,
    pub channel_configuration: u8,
}

impl AACConfig {
    pub fn sample_rate(&self) -> Option<u32> {
        sample_rate_for_index(self.sample_rate_index)
    }

    /// AudioSpecificConfig bytes (ISO 14496-3 1.6.2.1) for downstream decoders.
    pub fn audio_specific_config(&self) -> [u8; 2] {
        let object_type = self.profile as u8 + 1;
        [
            (object_type << 3) | (self.sample_rate_index >> 1),
            ((self.sample_rate_index & 1) << 7) | (self.channel_configuration << 3),
        ]
    }
}

impl Default for AACConfig {
    fn default() -> Self {
        Self {
            profile: ProfileType::LC,
            sample_rate_index: 4,     // 44100 Hz
            channel_configuration: 2, // Stereo
        }
    }
}

pub fn sample_rate_for_index(index: u8) -> Option<u32> {
    match index {
        0 => Some(96000),
        1 => Some(88200),
        2 => Some(64000),
        3 => Some(48000),
        4 => Some(44100),
        5 => Some(32000),
        6 => Some(24000),
        7 => Some(22050),
        8 => Some(16000),
        9 => Some(12000),
        10 => Some(11025),
        11 => Some(8000),
        12 => Some(7350),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ADTSHeader {
    pub sync_word: u32,             // 12 bits
    pub id: u8,                     // 1 bit, 0=MPEG-4, 1=MPEG-2
    pub layer: u8,                  // 2 bits
    pub protection_absent: bool,    // 1 bit
    pub profile: ProfileType,       // 2 bits
    pub sample_rate_index: u8,      // 4 bits
    pub private_bit: bool,          // 1 bit
    pub channel_configuration: u8,  // 3 bits
    pub original_copy: bool,        // 1 bit
    pub home: bool,                 // 1 bit
    pub copyright_id_bit: bool,     // 1 bit
    pub copyright_id_start: bool,   // 1 bit
    pub frame_length: u16,          // 13 bits, header included
    pub buffer_fullness: u16,       // 11 bits
    pub number_of_raw_blocks: u8,   // 2 bits, blocks minus one
}

impl ADTSHeader {
    /// Header for a single-block, CRC-less frame carrying `payload_len` bytes.
    ///
    /// Fails when the frame would not fit the 13-bit frame_length field.
    pub fn new(config: &AACConfig, payload_len: usize) -> Result<Self> {
        let frame_length = payload_len + ADTS_HEADER_SIZE;
        if frame_length > MAX_FRAME_LENGTH {
            return Err(DemuxError::Parser(format!(
                "ADTS payload of {} bytes exceeds the maximum frame length",
                payload_len
            )));
        }
        Ok(Self {
            sync_word: 0xFFF,
            id: 0,
            layer: 0,
            protection_absent: true,
            profile: config.profile,
            sample_rate_index: config.sample_rate_index,
            private_bit: false,
            channel_configuration: config.channel_configuration,
            original_copy: false,
            home: false,
            copyright_id_bit: false,
            copyright_id_start: false,
            frame_length: frame_length as u16,
            buffer_fullness: 0x7FF,
            number_of_raw_blocks: 0,
        })
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < ADTS_HEADER_SIZE {
            return Err(DemuxError::Parser("ADTS header too short".into()));
        }

        let mut reader = BitReader::new(&data[..ADTS_HEADER_SIZE]);

        let sync_word = reader.read_bits(12)?;
        if sync_word != 0xFFF {
            return Err(DemuxError::Parser("invalid ADTS sync word".into()));
        }

        let header = ADTSHeader {
            sync_word,
            id: reader.read_bits(1)? as u8,
            layer: reader.read_bits(2)? as u8,
            protection_absent: reader.read_flag()?,
            profile: ProfileType::from(reader.read_bits(2)? as u8),
            sample_rate_index: reader.read_bits(4)? as u8,
            private_bit: reader.read_flag()?,
            channel_configuration: reader.read_bits(3)? as u8,
            original_copy: reader.read_flag()?,
            home: reader.read_flag()?,
            copyright_id_bit: reader.read_flag()?,
            copyright_id_start: reader.read_flag()?,
            frame_length: reader.read_bits(13)? as u16,
            buffer_fullness: reader.read_bits(11)? as u16,
            number_of_raw_blocks: reader.read_bits(2)? as u8,
        };

        if header.sample_rate().is_none() {
            return Err(DemuxError::Parser(format!(
                "reserved sample rate index {}",
                header.sample_rate_index
            )));
        }
        if (header.frame_length as usize) < header.header_len() {
            return Err(DemuxError::Parser(format!(
                "frame length {} shorter than header",
                header.frame_length
            )));
        }

        Ok(header)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BitWriter::new();
        writer.write_bits(self.sync_word, 12);
        writer.write_bits(self.id as u32, 1);
        writer.write_bits(self.layer as u32, 2);
        writer.write_bit(self.protection_absent);
        writer.write_bits(self.profile as u32, 2);
        writer.write_bits(self.sample_rate_index as u32, 4);
        writer.write_bit(self.private_bit);
        writer.write_bits(self.channel_configuration as u32, 3);
        writer.write_bit(self.original_copy);
        writer.write_bit(self.home);
        writer.write_bit(self.copyright_id_bit);
        writer.write_bit(self.copyright_id_start);
        writer.write_bits(self.frame_length as u32, 13);
        writer.write_bits(self.buffer_fullness as u32, 11);
        writer.write_bits(self.number_of_raw_blocks as u32, 2);
        writer.into_bytes()
    }

    pub fn sample_rate(&self) -> Option<u32> {
        sample_rate_for_index(self.sample_rate_index)
    }

    pub fn header_len(&self) -> usize {
        if self.protection_absent {
            ADTS_HEADER_SIZE
        } else {
            ADTS_HEADER_SIZE_CRC
        }
    }

    /// Number of PCM samples this frame decodes to.
    pub fn samples(&self) -> u64 {
        (self.number_of_raw_blocks as u64 + 1) * SAMPLES_PER_FRAME
    }

    pub fn config(&self) -> AACConfig {
        AACConfig {
            profile: self.profile,
            sample_rate_index: self.sample_rate_index,
            channel_configuration: self.channel_configuration,
        }
    }
}
