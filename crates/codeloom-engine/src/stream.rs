//! Streamed response accumulation.
//!
//! Consumes a live token sequence from the gateway, appending each fragment
//! to the caller's buffer and invoking the publish hook after every append.
//! On cancellation or gateway error the partially accumulated buffer is
//! retained as-is, so observers keep the partial output instead of a blank
//! result.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use codeloom_core::{LoomError, Result, TokenStream};

/// Drains `stream` to completion.
///
/// Cancellation is cooperative: the token is observed between fragments,
/// which is the stream's only suspension point. Returns `Ok(())` on normal
/// exhaustion, `LoomError::Cancelled` when the token fires first, or the
/// stream's own error. The buffer is never rolled back.
pub async fn accumulate(
    mut stream: TokenStream,
    cancel: &CancellationToken,
    buffer: &mut String,
    mut publish: impl FnMut(&str),
) -> Result<()> {
    loop {
        tokio::select! {
            // Check cancellation before pulling another fragment so a
            // cancelled cycle never appends after the request.
            biased;
            _ = cancel.cancelled() => return Err(LoomError::Cancelled),
            next = stream.next() => match next {
                Some(Ok(fragment)) => {
                    buffer.push_str(&fragment);
                    publish(buffer);
                }
                Some(Err(err)) => return Err(err),
                None => return Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn token_stream(fragments: &[&str]) -> TokenStream {
        let items: Vec<Result<String>> =
            fragments.iter().map(|f| Ok((*f).to_string())).collect();
        Box::pin(stream::iter(items))
    }

    #[tokio::test]
    async fn test_accumulates_and_publishes_incrementally() {
        let mut buffer = String::new();
        let mut published = Vec::new();
        let cancel = CancellationToken::new();

        accumulate(
            token_stream(&["<p>", "hi", "</p>"]),
            &cancel,
            &mut buffer,
            |full| published.push(full.to_string()),
        )
        .await
        .unwrap();

        assert_eq!(buffer, "<p>hi</p>");
        assert_eq!(published, vec!["<p>", "<p>hi", "<p>hi</p>"]);
    }

    #[tokio::test]
    async fn test_error_retains_partial_buffer() {
        let items: Vec<Result<String>> = vec![
            Ok("partial".to_string()),
            Err(LoomError::gateway("stream broke")),
        ];
        let mut buffer = String::new();
        let cancel = CancellationToken::new();

        let result = accumulate(Box::pin(stream::iter(items)), &cancel, &mut buffer, |_| {}).await;

        assert!(result.is_err());
        assert_eq!(buffer, "partial");
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_stops_before_first_fragment() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut buffer = String::new();

        let result = accumulate(token_stream(&["x"]), &cancel, &mut buffer, |_| {}).await;

        assert!(matches!(result, Err(LoomError::Cancelled)));
        assert!(buffer.is_empty());
    }
}
