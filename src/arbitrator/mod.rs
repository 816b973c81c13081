use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinSet;

use crate::protocol::{
    FrameDirectory, FrameId, FrameRequest, FrameResponse, FrameTransport, OpenResponse,
    QueryResponse, TabId, TransportError,
};

#[derive(Debug, Error)]
pub enum ElectionError {
    #[error("tab {0:?} has no frames")]
    NoFrames(TabId),
    #[error("no frame in tab {0:?} holds a recent context capture")]
    NoRecentContext(TabId),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type ElectionResult<T> = std::result::Result<T, ElectionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Election {
    pub frame: FrameId,
    pub timestamp: u64,
}

/// Picks the response with the strictly greatest timestamp among those that
/// report a fresh context. On equal timestamps the earlier response wins.
pub fn pick_freshest<I>(responses: I) -> Option<Election>
where
    I: IntoIterator<Item = (FrameId, QueryResponse)>,
{
    let mut best: Option<Election> = None;
    for (frame, response) in responses {
        if !response.ok || !response.has_context {
            continue;
        }
        let replaces = match best {
            Some(current) => response.timestamp > current.timestamp,
            None => true,
        };
        if replaces {
            best = Some(Election {
                frame,
                timestamp: response.timestamp,
            });
        }
    }
    best
}

pub struct Arbitrator {
    directory: Arc<dyn FrameDirectory>,
    transport: Arc<dyn FrameTransport>,
    frame_timeout: Option<Duration>,
}

impl Arbitrator {
    pub fn new(
        directory: Arc<dyn FrameDirectory>,
        transport: Arc<dyn FrameTransport>,
        frame_timeout: Option<Duration>,
    ) -> Self {
        Self {
            directory,
            transport,
            frame_timeout,
        }
    }

    /// Queries every frame of `tab` and elects the freshest capture.
    ///
    /// Frames that fail, time out or answer with the wrong kind of response
    /// are treated as having no context. Replies are folded in the order the
    /// directory lists the frames, whatever order they arrive in, so a tie
    /// always goes to the first listed frame.
    pub async fn elect(&self, tab: TabId) -> ElectionResult<Election> {
        let frames = self.directory.frames(tab).await;
        if frames.is_empty() {
            return Err(ElectionError::NoFrames(tab));
        }

        let mut pending = JoinSet::new();
        for (position, frame) in frames.into_iter().enumerate() {
            let transport = Arc::clone(&self.transport);
            let limit = self.frame_timeout;
            pending.spawn(async move {
                let request = transport.send(tab, frame, FrameRequest::QueryContext);
                let outcome = match limit {
                    Some(limit) => match tokio::time::timeout(limit, request).await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(TransportError::Delivery {
                            frame,
                            message: format!("no answer within {} ms", limit.as_millis()),
                        }),
                    },
                    None => request.await,
                };
                (position, frame, outcome)
            });
        }

        let mut responses = Vec::new();
        while let Some(joined) = pending.join_next().await {
            let (position, frame, outcome) = match joined {
                Ok(result) => result,
                Err(err) => {
                    tracing::warn!(%err, "frame query task failed");
                    continue;
                }
            };
            match outcome {
                Ok(FrameResponse::Query(response)) => responses.push((position, frame, response)),
                Ok(FrameResponse::Open(_)) => {
                    let err = TransportError::UnexpectedResponse {
                        frame,
                        request: FrameRequest::QueryContext,
                    };
                    tracing::debug!(%err, "ignoring frame");
                    responses.push((position, frame, QueryResponse::failed()));
                }
                Err(err) => {
                    tracing::debug!(%err, "ignoring frame");
                    responses.push((position, frame, QueryResponse::failed()));
                }
            }
        }

        responses.sort_by_key(|(position, _, _)| *position);
        let election = pick_freshest(
            responses
                .into_iter()
                .map(|(_, frame, response)| (frame, response)),
        )
        .ok_or(ElectionError::NoRecentContext(tab))?;
        tracing::debug!(?tab, frame = ?election.frame, timestamp = election.timestamp, "frame elected");
        Ok(election)
    }

    /// Elects a frame and asks it, and only it, to open the palette.
    pub async fn run(&self, tab: TabId) -> ElectionResult<(Election, OpenResponse)> {
        let election = self.elect(tab).await?;
        let request = FrameRequest::OpenFromContext {
            timestamp: election.timestamp,
        };
        match self.transport.send(tab, election.frame, request).await? {
            FrameResponse::Open(response) => {
                if !response.opened {
                    tracing::info!(
                        frame = ?election.frame,
                        reason = response.reason.as_deref().unwrap_or("unknown"),
                        "elected frame declined to open"
                    );
                }
                Ok((election, response))
            }
            FrameResponse::Query(_) => Err(TransportError::UnexpectedResponse {
                frame: election.frame,
                request,
            }
            .into()),
        }
    }
}

impl std::fmt::Debug for Arbitrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arbitrator")
            .field("frame_timeout", &self.frame_timeout)
            .finish_non_exhaustive()
    }
}
