use anyhow::Context;
use ballista_engine::color::Rgb;
use ballista_engine::error::RemoteError;
use ballista_engine::planner::Grid;
use ballista_engine::remote::Remote;
use ballista_proto::{
    ColorsResponse, GenerateResponse, PickRequest, QueueEntry, QueueRequest, QueueResponse,
    ShootRequest, ShootResponse, StageInfoResponse,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "http://api.datsart.dats.team/";

const NO_FIELDS: &[(&str, &str)] = &[];

/// The game API over HTTP. Every call is a form POST with the bearer token.
pub struct HttpRemote {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpRemote {
    pub fn new(http: reqwest::Client, base_url: &str, token: &str) -> HttpRemote {
        HttpRemote {
            http,
            base_url: base_url.to_string(),
            token: token.to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send<F>(&self, url: &str, form: &F) -> anyhow::Result<reqwest::Response>
    where
        F: Serialize + ?Sized,
    {
        log::debug!("POST {}", url);
        self.http
            .post(url)
            .bearer_auth(&self.token)
            .form(form)
            .send()
            .await
            .with_context(|| format!("POST {url}"))
    }

    async fn post<F, T>(&self, path: &str, form: &F) -> anyhow::Result<T>
    where
        F: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self.send(&url, form).await?;
        let status = response.status();
        let body = response.text().await?;
        serde_json::from_str(&body)
            .with_context(|| format!("unexpected {status} response from {url}: {body}"))
    }

    /// Raw stage/level description.
    pub async fn stage_next(&self) -> anyhow::Result<serde_json::Value> {
        self.post(ballista_proto::STAGE_NEXT, NO_FIELDS).await
    }

    /// URL of the image the current stage wants painted.
    pub async fn stage_info(&self) -> anyhow::Result<String> {
        let res: StageInfoResponse = self.post(ballista_proto::STAGE_INFO, NO_FIELDS).await?;
        Ok(res.response.canvas.url)
    }
}

impl Remote for HttpRemote {
    async fn colors(&self) -> Result<HashMap<String, u64>, RemoteError> {
        let res: ColorsResponse = self.post(ballista_proto::COLORS_LIST, NO_FIELDS).await?;
        Ok(res.response)
    }

    async fn shoot(&self, request: &ShootRequest) -> Result<ShootResponse, RemoteError> {
        Ok(self
            .post(ballista_proto::BALLISTA_SHOOT, &request.form())
            .await?)
    }

    async fn queue(&self, id: i64) -> Result<Vec<QueueEntry>, RemoteError> {
        let res: QueueResponse = self
            .post(ballista_proto::STATE_QUEUE, &QueueRequest { id })
            .await?;
        Ok(res.response)
    }

    async fn generate(&self) -> Result<i64, RemoteError> {
        let res: GenerateResponse = self
            .post(ballista_proto::FACTORY_GENERATE, NO_FIELDS)
            .await?;
        Ok(res.info.tick)
    }

    async fn pick(&self, num: u32, tick: i64) -> Result<(), RemoteError> {
        // The body is not needed, only a failed HTTP status counts as an error.
        let url = self.url(ballista_proto::FACTORY_PICK);
        self.send(&url, &PickRequest { num, tick })
            .await?
            .error_for_status()
            .with_context(|| format!("POST {url}"))?;
        Ok(())
    }
}

/// Flattens a decoded image into a grid of RGB cells. Alpha is dropped.
pub fn grid_from_image(image: &image::DynamicImage) -> anyhow::Result<Grid> {
    let rgb = image.to_rgb8();
    let cells = rgb
        .pixels()
        .map(|p| Rgb::new(p.0[0], p.0[1], p.0[2]))
        .collect();
    Grid::new(rgb.width() as usize, rgb.height() as usize, cells)
}

pub async fn fetch_grid(http: &reqwest::Client, url: &str) -> anyhow::Result<Grid> {
    log::info!("Fetching {}", url);
    let bytes = http
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    let image = image::load_from_memory(&bytes).with_context(|| format!("decoding {url}"))?;
    grid_from_image(&image)
}
