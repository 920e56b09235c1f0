//! Transactional creation of whole video graphs.

use annotator_core::submission::NewVideoGraph;
use sqlx::PgPool;

use crate::models::video::Video;
use crate::repositories::{QueryRepo, VideoRepo};

/// Writes validated submissions.
pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Insert every video with its nested queries and annotations in a
    /// single transaction. Any failure rolls back the whole batch.
    ///
    /// Returns the created video rows in submission order.
    pub async fn create_graphs(
        pool: &PgPool,
        graphs: &[NewVideoGraph],
    ) -> Result<Vec<Video>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut videos = Vec::with_capacity(graphs.len());

        for graph in graphs {
            let video = VideoRepo::insert_tx(&mut tx, graph).await?;
            for query in &graph.queries {
                QueryRepo::insert_tx(&mut tx, video.id, query).await?;
            }
            videos.push(video);
        }

        tx.commit().await?;
        tracing::debug!(videos = videos.len(), "Submission batch committed");
        Ok(videos)
    }
}
