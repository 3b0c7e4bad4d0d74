use serde::{Deserialize, Serialize};

use crate::{PixsurfError, PixsurfResult, effects::blur::MAX_BLUR_RADIUS};

/// A named texture input of an effect, bound to a sampler register.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerSlot {
    /// Input name, e.g. `"Input"`.
    pub name: String,
    /// Sampler register index.
    pub register: u32,
}

/// A named numeric constant of an effect, bound to a constant register.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShaderConstant {
    /// Constant name, e.g. `"Amount"`.
    pub name: String,
    /// Constant register index.
    pub register: u32,
    /// Value bound at render time.
    pub value: f64,
}

/// Everything a compositing pipeline needs to bind one effect invocation.
///
/// Each sampler slot consumes a surface in the canonical premultiplied BGRA8
/// layout with its own stride.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectBinding {
    /// Texture inputs.
    pub samplers: Vec<SamplerSlot>,
    /// Numeric constants.
    pub constants: Vec<ShaderConstant>,
}

impl EffectBinding {
    /// Register of the sampler called `name`.
    pub fn sampler(&self, name: &str) -> Option<u32> {
        self.samplers
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.register)
    }

    /// Value of the constant called `name`.
    pub fn constant(&self, name: &str) -> Option<f64> {
        self.constants
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value)
    }
}

/// Parameters of the unsharp-mask effect.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsharpMaskParams {
    /// Strength of the sharpening, `orig + amount * (orig - blurred)`.
    pub amount: f64,
    /// Minimum per-channel difference, in 8-bit levels, before a channel is sharpened.
    pub threshold: f64,
    /// Blur kernel radius in pixels for the mask, at most [`MAX_BLUR_RADIUS`].
    pub radius: u32,
    /// Gaussian sigma of the mask blur.
    pub sigma: f32,
}

impl Default for UnsharpMaskParams {
    fn default() -> Self {
        Self {
            amount: 0.5,
            threshold: 1.0,
            radius: 2,
            sigma: 1.0,
        }
    }
}

impl UnsharpMaskParams {
    /// Sampler slot of the surface being sharpened.
    pub const INPUT: &'static str = "Input";
    /// Sampler slot of the blurred mask.
    pub const BLUR_MASK: &'static str = "BlurMask";
    /// Constant slot of [`UnsharpMaskParams::amount`].
    pub const AMOUNT: &'static str = "Amount";
    /// Constant slot of [`UnsharpMaskParams::threshold`].
    pub const THRESHOLD: &'static str = "Threshold";

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> PixsurfResult<Self> {
        let params: Self = serde_json::from_str(s)
            .map_err(|e| PixsurfError::validation(format!("unsharp params JSON: {e}")))?;
        params.validate()?;
        Ok(params)
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> PixsurfResult<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(PixsurfError::validation("unsharp amount must be finite and >= 0"));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(PixsurfError::validation(
                "unsharp threshold must be finite and >= 0",
            ));
        }
        if self.radius > MAX_BLUR_RADIUS {
            return Err(PixsurfError::validation(format!(
                "unsharp radius {} exceeds {MAX_BLUR_RADIUS}",
                self.radius
            )));
        }
        if self.radius > 0 && (!self.sigma.is_finite() || self.sigma <= 0.0) {
            return Err(PixsurfError::validation("unsharp sigma must be > 0"));
        }
        Ok(())
    }

    /// Sampler slots `Input` (s0) and `BlurMask` (s1), constants `Amount` (c0)
    /// and `Threshold` (c1).
    pub fn binding(&self) -> EffectBinding {
        EffectBinding {
            samplers: vec![
                SamplerSlot {
                    name: Self::INPUT.to_owned(),
                    register: 0,
                },
                SamplerSlot {
                    name: Self::BLUR_MASK.to_owned(),
                    register: 1,
                },
            ],
            constants: vec![
                ShaderConstant {
                    name: Self::AMOUNT.to_owned(),
                    register: 0,
                    value: self.amount,
                },
                ShaderConstant {
                    name: Self::THRESHOLD.to_owned(),
                    register: 1,
                    value: self.threshold,
                },
            ],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/binding.rs"]
mod tests;
