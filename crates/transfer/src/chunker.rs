/// Chunk size threshold: 1 GiB.
///
/// Parts this large keep the part count low enough that the server's
/// destination list covers any realistic bag while each part still fits
/// comfortably in memory one at a time.
pub const CHUNK_THRESHOLD: usize = 1024 * 1024 * 1024;

/// One completed chunk: a contiguous slice of the archive byte stream
/// destined for a single part upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based, contiguous across a stream.
    pub part_number: i32,
    pub data: Vec<u8>,
}

/// Regroups an incoming fragment sequence into chunks around a size
/// threshold.
///
/// A fragment that would carry the buffer to or past the threshold first
/// completes the current buffer as a chunk, then seeds the next buffer;
/// otherwise it is appended. [`finish`](Self::finish) emits whatever
/// remains, unconditionally, so every stream (including an empty one)
/// yields at least one chunk. Concatenating the emitted chunks in
/// part-number order reproduces the input byte-for-byte.
#[derive(Debug)]
pub struct ChunkAggregator {
    buf: Vec<u8>,
    threshold: usize,
    next_part: i32,
}

impl ChunkAggregator {
    pub fn new() -> Self {
        Self::with_threshold(CHUNK_THRESHOLD)
    }

    /// Aggregator with a custom threshold (tests; production uses
    /// [`CHUNK_THRESHOLD`]).
    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            buf: Vec::new(),
            threshold,
            next_part: 1,
        }
    }

    /// Feeds one fragment. Returns the completed chunk when the fragment
    /// crossed the threshold boundary.
    pub fn push(&mut self, fragment: &[u8]) -> Option<Chunk> {
        let completed = if !self.buf.is_empty() && self.buf.len() + fragment.len() >= self.threshold
        {
            Some(self.take_chunk())
        } else {
            None
        };
        self.buf.extend_from_slice(fragment);
        completed
    }

    /// Emits the final chunk. Always produces one, even for an empty
    /// stream.
    pub fn finish(mut self) -> Chunk {
        self.take_chunk()
    }

    /// Bytes currently buffered toward the next chunk.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    fn take_chunk(&mut self) -> Chunk {
        let part_number = self.next_part;
        self.next_part += 1;
        Chunk {
            part_number,
            data: std::mem::take(&mut self.buf),
        }
    }
}

impl Default for ChunkAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs a fragment sequence through an aggregator and returns every
    /// emitted chunk, final flush included.
    fn aggregate(threshold: usize, fragments: &[&[u8]]) -> Vec<Chunk> {
        let mut agg = ChunkAggregator::with_threshold(threshold);
        let mut chunks = Vec::new();
        for fragment in fragments {
            chunks.extend(agg.push(fragment));
        }
        chunks.push(agg.finish());
        chunks
    }

    fn concat(chunks: &[Chunk]) -> Vec<u8> {
        chunks.iter().flat_map(|c| c.data.iter().copied()).collect()
    }

    #[test]
    fn empty_stream_yields_one_empty_chunk() {
        let chunks = aggregate(1000, &[]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].part_number, 1);
        assert!(chunks[0].data.is_empty());
    }

    #[test]
    fn small_stream_yields_single_chunk() {
        let chunks = aggregate(1000, &[b"hello", b" ", b"world"]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].data, b"hello world");
    }

    #[test]
    fn concatenation_reproduces_input_exactly() {
        let fragments: Vec<Vec<u8>> = (0u8..50).map(|i| vec![i; 97]).collect();
        let refs: Vec<&[u8]> = fragments.iter().map(|f| f.as_slice()).collect();
        let expected: Vec<u8> = refs.concat();

        for threshold in [1, 10, 96, 97, 98, 500, 4851, 100_000] {
            let chunks = aggregate(threshold, &refs);
            assert_eq!(concat(&chunks), expected, "threshold {threshold}");

            // Part numbers are 1-based and contiguous.
            for (i, chunk) in chunks.iter().enumerate() {
                assert_eq!(chunk.part_number, i as i32 + 1);
            }
        }
    }

    #[test]
    fn flush_happens_before_the_crossing_fragment() {
        // 400 + 400 stays under 1000; the third 400 would reach 1200, so
        // the 800-byte buffer completes first and the final chunk holds
        // the remainder.
        let chunks = aggregate(1000, &[&[1u8; 400], &[2u8; 400], &[3u8; 400]]);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].data.len(), 800);
        assert_eq!(chunks[1].data.len(), 400);
        assert_eq!(&chunks[0].data[..400], &[1u8; 400]);
        assert_eq!(&chunks[0].data[400..], &[2u8; 400]);
        assert_eq!(chunks[1].data, vec![3u8; 400]);
    }

    #[test]
    fn exact_threshold_fragment_completes_buffer() {
        // buffer 1 byte, fragment reaches exactly the threshold.
        let chunks = aggregate(10, &[b"a", &[9u8; 9]]);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].data, b"a");
        assert_eq!(chunks[1].data, vec![9u8; 9]);
    }

    #[test]
    fn completed_chunks_never_exceed_threshold_for_small_fragments() {
        let fragments: Vec<Vec<u8>> = (0..200).map(|i| vec![i as u8; 7]).collect();
        let refs: Vec<&[u8]> = fragments.iter().map(|f| f.as_slice()).collect();
        let chunks = aggregate(100, &refs);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.data.len() < 100);
            // With 7-byte fragments a completed chunk sits within one
            // fragment of the threshold.
            assert!(chunk.data.len() >= 100 - 7);
        }
    }

    #[test]
    fn oversized_fragment_lands_in_its_own_chunk() {
        let chunks = aggregate(10, &[b"abc", &[1u8; 50], b"xyz"]);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].data, b"abc");
        assert_eq!(chunks[1].data, vec![1u8; 50]);
        assert_eq!(chunks[2].data, b"xyz");
    }

    #[test]
    fn buffered_tracks_pending_bytes() {
        let mut agg = ChunkAggregator::with_threshold(100);
        assert_eq!(agg.buffered(), 0);
        agg.push(b"12345");
        assert_eq!(agg.buffered(), 5);
    }
}
