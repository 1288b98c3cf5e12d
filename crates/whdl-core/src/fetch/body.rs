//! Response bodies: buffered JSON documents and streamed binary transfers.

use crate::retry::FetchError;
use curl::easy::Easy;
use serde::de::DeserializeOwned;
use std::io::Write;

/// Outcome of a streamed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transferred {
    /// Bytes handed to the sink.
    pub bytes: u64,
    /// `Content-Length` declared by the server, if any.
    pub content_length: Option<u64>,
}

fn expect_ok(easy: &mut Easy) -> Result<(), FetchError> {
    let code = easy.response_code()?;
    if code != 200 {
        return Err(FetchError::Http(code));
    }
    Ok(())
}

/// GET `url` and decode the 200 response body as JSON.
pub fn get_json<T: DeserializeOwned>(easy: &mut Easy, url: &str) -> Result<T, FetchError> {
    let mut body = Vec::new();
    easy.url(url)?;
    easy.get(true)?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }
    expect_ok(easy)?;
    Ok(serde_json::from_slice(&body)?)
}

/// GET `url` and stream the body into `sink` chunk by chunk, never holding the
/// whole payload in memory. The sink may have received bytes even when this
/// returns an error; the caller owns discarding them.
pub fn stream_to<W: Write>(easy: &mut Easy, url: &str, sink: &mut W) -> Result<Transferred, FetchError> {
    let mut bytes = 0u64;
    let mut sink_error: Option<std::io::Error> = None;
    easy.url(url)?;
    easy.get(true)?;

    let mut transfer = easy.transfer();
    transfer.write_function(|data| match sink.write_all(data) {
        Ok(()) => {
            bytes += data.len() as u64;
            Ok(data.len())
        }
        Err(e) => {
            sink_error = Some(e);
            // Short count aborts the transfer.
            Ok(0)
        }
    })?;
    let performed = transfer.perform();
    drop(transfer);

    if let Err(e) = performed {
        if let Some(io) = sink_error.take() {
            return Err(FetchError::Storage(io));
        }
        return Err(FetchError::Curl(e));
    }
    expect_ok(easy)?;

    let declared = easy.content_length_download()?;
    let content_length = (declared >= 0.0).then(|| declared as u64);
    if let Some(expected) = content_length {
        if expected != bytes {
            return Err(FetchError::PartialTransfer {
                expected,
                received: bytes,
            });
        }
    }
    Ok(Transferred {
        bytes,
        content_length,
    })
}
