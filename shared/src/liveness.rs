use async_trait::async_trait;

use crate::submit::Classifier;
use crate::PING_RETRY_DELAY_MS;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Pause {
    async fn pause(&self, millis: u32);
}

/// Probes with no upper bound until the classifier reports itself alive.
/// Returns the number of probes sent.
pub async fn poll_until_alive<C, P>(classifier: &C, pause: &P) -> u32
where
    C: Classifier + ?Sized,
    P: Pause + ?Sized,
{
    let mut probes = 0;
    loop {
        probes += 1;
        if let Ok(response) = classifier.ping().await {
            if response.is_alive() {
                return probes;
            }
        }
        pause.pause(PING_RETRY_DELAY_MS).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::submit::tests::ScriptedClassifier;
    use crate::submit::TransportError;
    use crate::PingResponse;

    #[derive(Default)]
    struct RecordedPause {
        waits: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl Pause for RecordedPause {
        async fn pause(&self, millis: u32) {
            self.waits.lock().unwrap().push(millis);
        }
    }

    #[tokio::test]
    async fn stops_at_first_alive_response() {
        let classifier = ScriptedClassifier::new(
            vec![],
            vec![
                Err(TransportError::Network("asleep".into())),
                Ok(PingResponse {
                    status: "starting".into(),
                }),
                Ok(PingResponse::alive()),
                Err(TransportError::Status(500)),
            ],
        );
        let pause = RecordedPause::default();
        let probes = poll_until_alive(&classifier, &pause).await;
        assert_eq!(probes, 3);
        assert_eq!(*classifier.ping_count.lock().unwrap(), 3);
        assert_eq!(
            *pause.waits.lock().unwrap(),
            vec![PING_RETRY_DELAY_MS, PING_RETRY_DELAY_MS]
        );
    }

    #[tokio::test]
    async fn alive_on_first_probe_never_pauses() {
        let classifier = ScriptedClassifier::new(vec![], vec![Ok(PingResponse::alive())]);
        let pause = RecordedPause::default();
        assert_eq!(poll_until_alive(&classifier, &pause).await, 1);
        assert!(pause.waits.lock().unwrap().is_empty());
    }
}
