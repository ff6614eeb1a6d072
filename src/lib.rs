//! # Galaxy Generator
//!
//! An interactive procedural spiral-galaxy point cloud generator built with Rust.
//!
//! ## Features
//!
//! - **Procedural Generation**: Spiral arms, spin and power-law scatter from a handful of parameters
//! - **Radial Colour Gradient**: Core-to-rim colour interpolation per star
//! - **GPU Rendering**: Additive-blended point sprites with size attenuation via wgpu
//! - **Live Tweaking**: egui parameter panel that regenerates the galaxy when an edit is committed
//!
//! ## Architecture Design
//!
//! The domain layer ([`galaxy`]) has no rendering dependency. The renderer plugs in
//! through the [`galaxy::SceneGraph`] trait, so generation and resource replacement
//! can be driven from tests with a recording scene.
//!
//! ### Example
//!
//! ```
//! use galaxy_generator::galaxy::{GalaxyParameters, PointCloudGenerator, SeedPolicy};
//!
//! let params = GalaxyParameters {
//!     particle_count: 1_000,
//!     ..Default::default()
//! };
//! let mut rng = SeedPolicy::Fixed(7).rng();
//! let cloud = PointCloudGenerator::new().generate(&params, &mut rng).unwrap();
//! assert_eq!(cloud.len(), 1_000);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Application entry point and error types
//! - [`config`]: TOML/JSON configuration with environment overrides
//! - [`galaxy`]: Parameters, generation algorithm, lifecycle and parameter store
//! - [`render`]: Orbit camera, GPU point cloud and renderer
//! - [`ui`]: egui integration and parameter panel
//! - [`platform`]: Window and input abstraction

/// Application entry point, main loop and error types
pub mod core;
/// Configuration system
pub mod config;
/// Galaxy domain model and generation
pub mod galaxy;
/// Platform abstraction layer
pub mod platform;
/// Rendering with wgpu
pub mod render;
/// Parameter panel built on egui
pub mod ui;
