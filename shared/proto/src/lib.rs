//! Wire types for the art game API.
//!
//! Every endpoint is a form-encoded POST answered with JSON. Only the fields the
//! painter actually reads are modelled; everything else is ignored by serde.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const STAGE_NEXT: &str = "art/stage/next";
pub const STAGE_INFO: &str = "art/stage/info";
pub const FACTORY_GENERATE: &str = "art/factory/generate";
pub const FACTORY_PICK: &str = "art/factory/pick";
pub const COLORS_LIST: &str = "art/colors/list";
pub const BALLISTA_SHOOT: &str = "art/ballista/shoot";
pub const STATE_QUEUE: &str = "art/state/queue";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    pub info: GenerateInfo,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GenerateInfo {
    pub tick: i64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PickRequest {
    pub num: u32,
    pub tick: i64,
}

/// Keys are packed 24-bit colors rendered as decimal strings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ColorsResponse {
    #[serde(default)]
    pub response: HashMap<String, u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShootResponse {
    pub status: i64,
    #[serde(default)]
    pub response: Option<ShootReceipt>,
}

impl ShootResponse {
    pub fn command_id(&self) -> Option<i64> {
        self.response.as_ref().and_then(|r| r.id)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ShootReceipt {
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct QueueRequest {
    pub id: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct QueueResponse {
    #[serde(default)]
    pub response: Vec<QueueEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: i64,
    pub status: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StageInfoResponse {
    pub response: StageInfo,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StageInfo {
    pub canvas: Canvas,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Canvas {
    pub url: String,
}

/// Form body for `ballista/shoot`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShootRequest {
    pub angle_horizontal: f64,
    pub angle_vertical: f64,
    pub power: f64,
    /// (packed color, units) pairs.
    pub colors: Vec<(u32, u64)>,
}

impl ShootRequest {
    /// Flattens the request into `application/x-www-form-urlencoded` pairs, with one
    /// `colors[<color>]` field per pigment.
    pub fn form(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            (
                "angleHorizontal".to_string(),
                self.angle_horizontal.to_string(),
            ),
            ("angleVertical".to_string(), self.angle_vertical.to_string()),
            ("power".to_string(), self.power.to_string()),
        ];
        for (color, amount) in &self.colors {
            fields.push((format!("colors[{color}]"), amount.to_string()));
        }
        fields
    }
}
