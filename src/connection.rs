use bytes::Bytes;
use futures_util::{Sink, SinkExt};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::errors::RpcError;

pub(crate) type FramedConnection = Framed<TcpStream, LengthDelimitedCodec>;

// Every envelope travels as one length-prefixed frame.
pub(crate) fn frame(stream: TcpStream, max_frame_length: usize) -> FramedConnection {
    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(max_frame_length)
        .new_codec();
    Framed::new(stream, codec)
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Bytes, RpcError> {
    Ok(Bytes::from(bincode::serialize(value)?))
}

pub(crate) fn decode<T: DeserializeOwned>(frame: &[u8]) -> Result<T, RpcError> {
    Ok(bincode::deserialize(frame)?)
}

pub(crate) async fn send_envelope<S, T>(sink: &mut S, value: &T) -> Result<(), RpcError>
where
    S: Sink<Bytes, Error = std::io::Error> + Unpin,
    T: Serialize,
{
    let data = encode(value)?;
    sink.send(data).await.map_err(RpcError::IoError)
}
