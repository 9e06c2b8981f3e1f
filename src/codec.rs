//! Secure Locker - Binary/Word Codec
//!
//! Packs raw bytes into big-endian 32-bit words and back. The word block is
//! also the plaintext frame handed to the cipher.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{LockerError, LockerResult};

/// Length of the `sig_bytes` header in a serialized frame
const FRAME_HEADER_LEN: usize = 8;

/// Words plus the number of significant bytes they carry
#[derive(Debug, Clone, PartialEq, Eq, Default, Zeroize, ZeroizeOnDrop)]
pub struct WordBlock {
    /// Big-endian packed words; the last one may be right-padded with zeros
    pub words: Vec<u32>,
    /// True byte length of the packed data
    pub sig_bytes: usize,
}

impl WordBlock {
    /// Serialize as `sig_bytes (u64 BE) || words (u32 BE each)`
    pub fn to_frame(&self) -> Zeroizing<Vec<u8>> {
        let capacity = FRAME_HEADER_LEN + self.words.len() * 4;
        let mut frame = Zeroizing::new(Vec::with_capacity(capacity));
        frame.extend_from_slice(&(self.sig_bytes as u64).to_be_bytes());
        for word in &self.words {
            frame.extend_from_slice(&word.to_be_bytes());
        }
        frame
    }

    /// Parse a frame produced by [`WordBlock::to_frame`]
    ///
    /// Rejects frames whose word count does not match the declared length or
    /// whose padding bytes are not zero.
    pub fn from_frame(frame: &[u8]) -> LockerResult<Self> {
        if frame.len() < FRAME_HEADER_LEN {
            return Err(LockerError::Decryption("frame too short".into()));
        }

        let (header, body) = frame.split_at(FRAME_HEADER_LEN);
        let mut len_bytes = [0u8; FRAME_HEADER_LEN];
        len_bytes.copy_from_slice(header);
        let declared = u64::from_be_bytes(len_bytes);

        if body.len() % 4 != 0 {
            return Err(LockerError::Decryption("frame body is not word aligned".into()));
        }

        let sig_bytes = usize::try_from(declared)
            .map_err(|_| LockerError::Decryption("declared length out of range".into()))?;
        if words_for(sig_bytes) != body.len() / 4 {
            return Err(LockerError::Decryption(format!(
                "declared length {} does not match {} words",
                sig_bytes,
                body.len() / 4
            )));
        }

        let words: Vec<u32> = body
            .chunks_exact(4)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        let block = WordBlock { words, sig_bytes };
        if !block.padding_is_zero() {
            return Err(LockerError::Decryption("non-zero padding in last word".into()));
        }

        Ok(block)
    }

    fn padding_is_zero(&self) -> bool {
        let used = self.sig_bytes % 4;
        match self.words.last() {
            Some(last) if used != 0 => last & (u32::MAX >> (used * 8)) == 0,
            _ => true,
        }
    }
}

/// Number of words needed for `len` bytes
fn words_for(len: usize) -> usize {
    len.div_ceil(4)
}

/// Pack bytes into big-endian words
pub fn bytes_to_words(bytes: &[u8]) -> WordBlock {
    let words = bytes
        .chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_be_bytes(word)
        })
        .collect();

    WordBlock {
        words,
        sig_bytes: bytes.len(),
    }
}

/// Unpack exactly `block.sig_bytes` bytes
///
/// Stops early if the block holds fewer words than the declared length needs.
pub fn words_to_bytes(block: &WordBlock) -> Vec<u8> {
    let available = block.words.len().saturating_mul(4);
    let mut out = Vec::with_capacity(block.sig_bytes.min(available));
    for word in &block.words {
        let remaining = block.sig_bytes - out.len();
        if remaining == 0 {
            break;
        }
        let be = word.to_be_bytes();
        out.extend_from_slice(&be[..remaining.min(4)]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_edge_lengths() {
        let big: Vec<u8> = (0..10_007u32).map(|i| (i * 31 % 251) as u8).collect();
        let inputs: Vec<&[u8]> = vec![b"", b"a", b"ab", b"abc", b"abcd", b"abcde", &big];

        for input in inputs {
            let block = bytes_to_words(input);
            assert_eq!(block.sig_bytes, input.len());
            assert_eq!(block.words.len(), words_for(input.len()));
            assert_eq!(words_to_bytes(&block), input);
        }
    }

    #[test]
    fn test_big_endian_packing() {
        let block = bytes_to_words(&[0x01, 0x02, 0x03, 0x04, 0xAA]);
        assert_eq!(block.words, vec![0x0102_0304, 0xAA00_0000]);
        assert_eq!(block.sig_bytes, 5);
    }

    #[test]
    fn test_empty_input() {
        let block = bytes_to_words(&[]);
        assert!(block.words.is_empty());
        assert_eq!(block.sig_bytes, 0);
        assert!(words_to_bytes(&block).is_empty());
    }

    #[test]
    fn test_unpack_stops_at_declared_length() {
        let block = WordBlock {
            words: vec![0x6869_0000, 0xFFFF_FFFF],
            sig_bytes: 2,
        };
        assert_eq!(words_to_bytes(&block), b"hi");

        let short = WordBlock {
            words: vec![0x6869_2121],
            sig_bytes: 9,
        };
        assert_eq!(words_to_bytes(&short), b"hi!!");
    }

    #[test]
    fn test_unpack_huge_declared_length() {
        let block = WordBlock {
            words: vec![0x6869_2121],
            sig_bytes: usize::MAX / 2,
        };
        assert_eq!(words_to_bytes(&block), b"hi!!");

        let empty = WordBlock {
            words: Vec::new(),
            sig_bytes: usize::MAX,
        };
        assert!(words_to_bytes(&empty).is_empty());
    }

    #[test]
    fn test_frame_roundtrip() {
        let block = bytes_to_words(b"hello");
        let frame = block.to_frame();
        assert_eq!(frame.len(), 8 + 8);
        assert_eq!(WordBlock::from_frame(&frame).unwrap(), block);

        let empty = bytes_to_words(b"");
        assert_eq!(WordBlock::from_frame(&empty.to_frame()).unwrap(), empty);
    }

    #[test]
    fn test_frame_rejects_malformed() {
        assert!(WordBlock::from_frame(&[0u8; 4]).is_err());

        // declared 5 bytes, only one word
        let mut frame = 5u64.to_be_bytes().to_vec();
        frame.extend_from_slice(&[1, 2, 3, 4]);
        assert!(matches!(
            WordBlock::from_frame(&frame),
            Err(LockerError::Decryption(_))
        ));

        // unaligned body
        let mut frame = 1u64.to_be_bytes().to_vec();
        frame.extend_from_slice(&[1, 0, 0]);
        assert!(WordBlock::from_frame(&frame).is_err());

        // garbage in the padding
        let mut frame = 1u64.to_be_bytes().to_vec();
        frame.extend_from_slice(&[0x41, 0, 0, 7]);
        assert!(WordBlock::from_frame(&frame).is_err());
    }
}
