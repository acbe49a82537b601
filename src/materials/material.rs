// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Specular {
    pub exponent: Float,
    pub color: Vector3f,
}

impl Default for Specular {
    fn default() -> Self {
        Self { exponent: 0.0, color: Vector3f::new(1.0, 1.0, 1.0) }
    }
}

/// How a surface continues a path, derived from the two material flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScatterLobe {
    Diffuse,
    Mirror,
    Refractive,
    /// Reflective and refractive: Schlick-weighted choice between the two.
    Fresnel,
}

/// Scene-wide material record. Any `emittance > 0` makes the surface a light
/// and ends paths that hit it.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Vector3f,
    pub specular: Specular,
    pub reflective: bool,
    pub refractive: bool,
    pub index_of_refraction: Float,
    pub emittance: Float,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vector3f::new(0.5, 0.5, 0.5),
            specular: Specular::default(),
            reflective: false,
            refractive: false,
            index_of_refraction: 1.0,
            emittance: 0.0,
        }
    }
}

impl Material {
    pub fn diffuse(color: Vector3f) -> Self {
        Self { color, ..Self::default() }
    }

    pub fn mirror(specular_color: Vector3f) -> Self {
        Self {
            specular: Specular { exponent: 0.0, color: specular_color },
            reflective: true,
            ..Self::default()
        }
    }

    pub fn glass(specular_color: Vector3f, index_of_refraction: Float) -> Self {
        Self {
            specular: Specular { exponent: 0.0, color: specular_color },
            refractive: true,
            index_of_refraction,
            ..Self::default()
        }
    }

    pub fn dielectric(specular_color: Vector3f, index_of_refraction: Float) -> Self {
        Self { reflective: true, ..Self::glass(specular_color, index_of_refraction) }
    }

    pub fn emitter(color: Vector3f, emittance: Float) -> Self {
        Self { color, emittance, ..Self::default() }
    }

    pub fn is_emissive(&self) -> bool {
        self.emittance > 0.0
    }

    pub fn emitted(&self) -> Vector3f {
        self.color * self.emittance
    }

    pub fn lobe(&self) -> ScatterLobe {
        match (self.reflective, self.refractive) {
            (true, true) => ScatterLobe::Fresnel,
            (true, false) => ScatterLobe::Mirror,
            (false, true) => ScatterLobe::Refractive,
            (false, false) => ScatterLobe::Diffuse,
        }
    }
}
