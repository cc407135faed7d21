use crate::logic::eval_constants::{DEFAULT_DEPTH, LOSS_SCORE, VAL_KING, VAL_MAN};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};

// Twelve pieces at this weight stay far inside i32 on both sides.
const MAX_PIECE_VALUE: i32 = 1_000_000;
const MAX_LOSS_SCORE: i32 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Evaluation Parameters
    pub val_man: i32,
    pub val_king: i32,

    // Search Parameters
    pub max_depth: u8,
    pub loss_score: i32, // Score for the side left without a move
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            val_man: VAL_MAN,
            val_king: VAL_KING,

            max_depth: DEFAULT_DEPTH,
            loss_score: LOSS_SCORE,
        }
    }
}

#[derive(Deserialize)]
struct EngineConfigJson {
    val_man: Option<f32>,
    val_king: Option<f32>,
    loss_score: Option<f32>,

    max_depth: Option<u8>,
}

impl EngineConfig {
    /// Reads tuning overrides. Material and loss values are scale factors
    /// applied to the defaults; `max_depth` is taken as is. A factor that
    /// is not finite or pushes a value out of range is an error.
    pub fn load_from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        let json_config: EngineConfigJson = serde_json::from_str(json_str)?;
        let default = Self::default();

        Ok(Self {
            val_man: apply_scale(
                "val_man",
                default.val_man,
                json_config.val_man,
                MAX_PIECE_VALUE,
            )?,
            val_king: apply_scale(
                "val_king",
                default.val_king,
                json_config.val_king,
                MAX_PIECE_VALUE,
            )?,

            max_depth: json_config.max_depth.unwrap_or(default.max_depth),
            loss_score: apply_scale(
                "loss_score",
                default.loss_score,
                json_config.loss_score,
                MAX_LOSS_SCORE,
            )?,
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn apply_scale(
    name: &str,
    default_val: i32,
    scale: Option<f32>,
    bound: i32,
) -> Result<i32, serde_json::Error> {
    let Some(s) = scale else {
        return Ok(default_val);
    };
    let scaled = f64::from(default_val) * f64::from(s);
    if !scaled.is_finite() || scaled.abs() > f64::from(bound) {
        return Err(serde_json::Error::custom(format!(
            "{name} scale {s} puts the value outside -{bound}..={bound}"
        )));
    }
    Ok(scaled as i32)
}
