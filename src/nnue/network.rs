//! Network weights: JSON loading, quantization, and the process-wide
//! registration used to share one network across all searchers.

use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::errors::NnueError;

use super::{HIDDEN_SIZE, INPUT_SIZE, QA, QAB, QB};

/// Raw weight file: a JSON object of nested double arrays, keyed by layer.
#[derive(Deserialize)]
struct RawNetwork {
    #[serde(rename = "ft.weight")]
    ft_weight: Vec<Vec<f64>>,
    #[serde(rename = "ft.bias")]
    ft_bias: Vec<f64>,
    #[serde(rename = "out.weight")]
    out_weight: Vec<Vec<f64>>,
    #[serde(rename = "out.bias")]
    out_bias: Vec<f64>,
}

/// Quantized network weights.
///
/// The feature layer is kept twice: as rows for the full refresh and as a
/// flat array whose contiguous `HIDDEN_SIZE` slice for feature `idx`
/// starts at `idx * HIDDEN_SIZE`, which is what the incremental add/sub
/// walks.
#[derive(Debug)]
pub struct Network {
    /// Feature layer rows, `[input][hidden]`
    pub ft_weights: Vec<[i16; HIDDEN_SIZE]>,
    /// Feature layer flattened, slice per input feature
    pub ft_weights_flat: Vec<i16>,
    /// Feature layer bias, applied at evaluation time
    pub ft_bias: [i16; HIDDEN_SIZE],
    /// Output layer, side to move half first
    pub out_weights: [i16; 2 * HIDDEN_SIZE],
    /// Output bias, already at combined quantization
    pub out_bias: i32,
}

impl Network {
    /// Load and quantize a JSON weight file.
    pub fn from_json_file(path: &Path) -> Result<Self, NnueError> {
        let bytes = std::fs::read(path)?;
        Self::from_json_bytes(&bytes)
    }

    /// Parse and quantize weights from JSON text.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, NnueError> {
        let raw: RawNetwork = serde_json::from_slice(bytes)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawNetwork) -> Result<Self, NnueError> {
        check_shape("ft.weight", raw.ft_weight.len(), INPUT_SIZE)?;
        for row in &raw.ft_weight {
            check_shape("ft.weight row", row.len(), HIDDEN_SIZE)?;
        }
        check_shape("ft.bias", raw.ft_bias.len(), HIDDEN_SIZE)?;
        check_shape("out.weight", raw.out_weight.len(), 1)?;
        check_shape("out.weight row", raw.out_weight[0].len(), 2 * HIDDEN_SIZE)?;
        check_shape("out.bias", raw.out_bias.len(), 1)?;

        let mut ft_weights = Vec::with_capacity(INPUT_SIZE);
        let mut ft_weights_flat = Vec::with_capacity(INPUT_SIZE * HIDDEN_SIZE);
        for src in &raw.ft_weight {
            let mut row = [0i16; HIDDEN_SIZE];
            for (dst, &v) in row.iter_mut().zip(src) {
                *dst = quantize(v, QA);
            }
            ft_weights_flat.extend_from_slice(&row);
            ft_weights.push(row);
        }

        let mut ft_bias = [0i16; HIDDEN_SIZE];
        for (dst, &v) in ft_bias.iter_mut().zip(&raw.ft_bias) {
            *dst = quantize(v, QA);
        }

        let mut out_weights = [0i16; 2 * HIDDEN_SIZE];
        for (dst, &v) in out_weights.iter_mut().zip(&raw.out_weight[0]) {
            *dst = quantize(v, QB);
        }

        let out_bias = (raw.out_bias[0] * QAB as f64) as i32;

        Ok(Network {
            ft_weights,
            ft_weights_flat,
            ft_bias,
            out_weights,
            out_bias,
        })
    }

    /// The hidden-layer weight slice of one input feature, used by the
    /// incremental updates.
    #[inline]
    pub fn feature_slice(&self, idx: usize) -> &[i16] {
        &self.ft_weights_flat[idx * HIDDEN_SIZE..(idx + 1) * HIDDEN_SIZE]
    }
}

/// Multiply by the quantization factor and truncate toward zero.
#[inline]
fn quantize(v: f64, scale: i32) -> i16 {
    (v * scale as f64) as i16
}

fn check_shape(field: &'static str, got: usize, expected: usize) -> Result<(), NnueError> {
    if got == expected {
        Ok(())
    } else {
        Err(NnueError::Shape { field, expected, got })
    }
}

// ============================================================
// Process-wide registration
// ============================================================

static NETWORK: OnceLock<Network> = OnceLock::new();

/// Register a network for process-wide sharing. May be called once.
pub fn register(net: Network) -> Result<&'static Network, NnueError> {
    NETWORK.set(net).map_err(|_| NnueError::AlreadyRegistered)?;
    log::info!(
        "NNUE network registered ({} features, {} hidden)",
        INPUT_SIZE,
        HIDDEN_SIZE
    );
    Ok(NETWORK.get().expect("network registered above"))
}

/// Load a JSON weight file and register the result.
pub fn load_and_register(path: impl AsRef<Path>) -> Result<&'static Network, NnueError> {
    match Network::from_json_file(path.as_ref()) {
        Ok(net) => register(net),
        Err(e) => {
            log::warn!("NNUE weight load failed: {}", e);
            Err(e)
        }
    }
}

/// The registered network, if any.
#[inline]
pub fn registered() -> Option<&'static Network> {
    NETWORK.get()
}

/// Whether a network has been registered.
#[inline]
pub fn is_active() -> bool {
    NETWORK.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_json(ft_w: f64, ft_b: f64, out_w: f64, out_b: f64) -> Vec<u8> {
        let value = serde_json::json!({
            "ft.weight": vec![vec![ft_w; HIDDEN_SIZE]; INPUT_SIZE],
            "ft.bias": vec![ft_b; HIDDEN_SIZE],
            "out.weight": vec![vec![out_w; 2 * HIDDEN_SIZE]; 1],
            "out.bias": vec![out_b; 1],
        });
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_quantization_scales_and_truncates() {
        let net = Network::from_json_bytes(&raw_json(0.5, -0.25, 0.5, 0.1)).unwrap();
        assert_eq!(net.ft_weights[0][0], 127); // 0.5 * 255 = 127.5, truncated
        assert_eq!(net.ft_bias[0], -63); // -0.25 * 255 = -63.75, toward zero
        assert_eq!(net.out_weights[0], 32); // 0.5 * 64
        assert_eq!(net.out_bias, 1632); // 0.1 * 16320
    }

    #[test]
    fn test_flat_copy_matches_rows() {
        let net = Network::from_json_bytes(&raw_json(0.1, 0.0, 0.0, 0.0)).unwrap();
        for idx in [0, 1, INPUT_SIZE - 1] {
            assert_eq!(net.feature_slice(idx), &net.ft_weights[idx][..]);
        }
        assert_eq!(net.ft_weights_flat.len(), INPUT_SIZE * HIDDEN_SIZE);
    }

    #[test]
    fn test_shape_errors() {
        let value = serde_json::json!({
            "ft.weight": vec![vec![0.0; HIDDEN_SIZE]; 4],
            "ft.bias": vec![0.0; HIDDEN_SIZE],
            "out.weight": vec![vec![0.0; 2 * HIDDEN_SIZE]; 1],
            "out.bias": vec![0.0; 1],
        });
        let err = Network::from_json_bytes(&serde_json::to_vec(&value).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            NnueError::Shape { field: "ft.weight", expected, got: 4 } if expected == INPUT_SIZE
        ));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Network::from_json_bytes(b"{\"ft.weight\": 12}"),
            Err(NnueError::Json(_))
        ));
    }

    #[test]
    fn test_register_is_once_only() {
        let net = Network::from_json_bytes(&raw_json(0.0, 0.0, 0.0, 0.0)).unwrap();
        let registered_net = register(net).unwrap();
        assert!(is_active());
        assert!(std::ptr::eq(registered().unwrap(), registered_net));

        let again = Network::from_json_bytes(&raw_json(0.0, 0.0, 0.0, 0.0)).unwrap();
        assert!(matches!(register(again), Err(NnueError::AlreadyRegistered)));
    }
}
