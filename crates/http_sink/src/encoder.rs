//! Fragment encoder and array assembler

use bytes::{BufMut, Bytes, BytesMut};
use tracing::warn;

use contracts::{Batch, Codec};

/// Encode every event in order, dropping the ones the codec rejects
///
/// One warning is logged per dropped event; the rest of the batch continues.
pub fn encode_fragments(codec: &dyn Codec, sink_name: &str, batch: &Batch) -> Vec<Bytes> {
    let mut fragments = Vec::with_capacity(batch.len());

    for (index, event) in batch.events().iter().enumerate() {
        match codec.encode(event) {
            Ok(fragment) => fragments.push(fragment),
            Err(e) => {
                warn!(
                    sink = %sink_name,
                    codec = codec.name(),
                    index,
                    error = %e,
                    "codec event error, event dropped"
                );
            }
        }
    }

    fragments
}

/// Join fragments into a JSON array literal
///
/// Fragments are not re-validated; zero fragments yields `[]`.
pub fn assemble_array(fragments: &[Bytes]) -> Bytes {
    let content_len: usize = fragments.iter().map(Bytes::len).sum();
    let separators = fragments.len().saturating_sub(1);
    let mut out = BytesMut::with_capacity(content_len + separators + 2);

    out.put_u8(b'[');
    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            out.put_u8(b',');
        }
        out.extend_from_slice(fragment);
    }
    out.put_u8(b']');

    out.freeze()
}
