#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod domain;
pub mod engine;
pub mod geom;

use std::fmt;

use domain::{Domain, DomainId, DomainKind, DomainMap, DomainSpec, DomainVariant};
use engine::{GridSession, SessionConfig, SnapMode};
use geom::{BlendMode, Point2};
use serde::Serialize;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DomainExport {
    id: u64,
    kind: DomainKind,
    center: [f64; 2],
    radius: f64,
    amplitude: f64,
    blend_mode: BlendMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    eccentricity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
}

impl DomainExport {
    fn from_domain(domain: &Domain) -> Self {
        let base = domain.base();
        let (eccentricity, seed) = match domain.variant() {
            DomainVariant::Conic(conic) => (Some(conic.eccentricity()), None),
            DomainVariant::Noise(noise) => (None, Some(noise.noise().seed)),
            _ => (None, None),
        };
        DomainExport {
            id: domain.id().get(),
            kind: domain.kind(),
            center: base.center.to_array(),
            radius: base.radius,
            amplitude: base.amplitude,
            blend_mode: base.blend_mode,
            eccentricity,
            seed,
        }
    }
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct GridEngine {
    session: GridSession,
}

impl Default for GridEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl GridEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> GridEngine {
        GridEngine {
            session: GridSession::default(),
        }
    }

    /// Maak een engine met een volledige configuratie.
    #[wasm_bindgen]
    pub fn with_config(config: JsValue) -> Result<GridEngine, JsValue> {
        let config: SessionConfig = serde_wasm_bindgen::from_value(config).map_err(to_js_error)?;
        Ok(GridEngine {
            session: GridSession::new(config),
        })
    }

    /// Voeg een domein toe. `spec` volgt de velden van [`DomainSpec`].
    /// Geeft het id van het nieuwe domein terug.
    #[wasm_bindgen]
    pub fn create_domain(&mut self, kind: &str, spec: JsValue) -> Result<f64, JsValue> {
        let spec: DomainSpec = serde_wasm_bindgen::from_value(spec).map_err(to_js_error)?;
        self.create(kind, &spec)
    }

    /// Voeg een domein toe met standaardinstellingen.
    #[wasm_bindgen]
    pub fn add_domain(&mut self, kind: &str, x: f64, y: f64, radius: f64) -> Result<f64, JsValue> {
        self.create(kind, &DomainSpec::new(Point2::new(x, y), radius))
    }

    /// Verwijder een domein. Geeft `false` terug als het id onbekend is.
    #[wasm_bindgen]
    pub fn remove_domain(&mut self, id: f64) -> bool {
        match domain_id_from_js(id) {
            Some(id) => self.session.remove_domain(id),
            None => false,
        }
    }

    #[wasm_bindgen]
    pub fn clear_domains(&mut self) {
        self.session.clear_domains();
    }

    #[wasm_bindgen]
    pub fn domain_count(&self) -> usize {
        self.session.domains().len()
    }

    /// Haal de actieve domeinen op, oudste eerst.
    #[wasm_bindgen]
    pub fn get_domains(&self) -> Result<JsValue, JsValue> {
        let domains: Vec<DomainExport> = self
            .session
            .domains()
            .iter()
            .map(DomainExport::from_domain)
            .collect();
        serde_wasm_bindgen::to_value(&domains).map_err(to_js_error)
    }

    /// Transformeer een punt naar vervormde ruimte. Geeft `[x, y]` terug.
    #[wasm_bindgen]
    pub fn transform_point(&mut self, x: f64, y: f64) -> Vec<f64> {
        self.session.transform_point(Point2::new(x, y)).to_array().to_vec()
    }

    /// Benader het oorspronkelijke punt van een vervormd punt.
    #[wasm_bindgen]
    pub fn inverse_transform_point(&mut self, x: f64, y: f64) -> Vec<f64> {
        self.session
            .inverse_transform_point(Point2::new(x, y))
            .to_array()
            .to_vec()
    }

    #[wasm_bindgen]
    pub fn get_blending_weights(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        let weights = self.session.blending_weights(Point2::new(x, y));
        serde_wasm_bindgen::to_value(weights.as_ref()).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn effective_grid_size(&mut self, x: f64, y: f64) -> f64 {
        self.session.effective_grid_size(Point2::new(x, y))
    }

    #[wasm_bindgen]
    pub fn snap(&mut self, x: f64, y: f64) -> Vec<f64> {
        self.session.snap(Point2::new(x, y)).to_array().to_vec()
    }

    /// Snap naar de dichtstbijzijnde kandidaat. `candidates` is een platte
    /// lijst `[x0, y0, x1, y1, ...]`.
    #[wasm_bindgen]
    pub fn snap_to_candidates(&mut self, x: f64, y: f64, candidates: &[f64]) -> Vec<f64> {
        let candidates: Vec<Point2> = candidates
            .chunks_exact(2)
            .map(|pair| Point2::new(pair[0], pair[1]))
            .collect();
        self.session
            .snap_to_candidates(Point2::new(x, y), &candidates)
            .to_array()
            .to_vec()
    }

    /// Vervormde rasterpunten voor het zichtbare gebied.
    #[wasm_bindgen]
    pub fn get_grid_cells(&mut self) -> Result<JsValue, JsValue> {
        let cells = self.session.grid_cells();
        serde_wasm_bindgen::to_value(cells.as_ref()).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn screen_to_world(&self, x: f64, y: f64) -> Vec<f64> {
        self.session.screen_to_world(Point2::new(x, y)).to_array().to_vec()
    }

    #[wasm_bindgen]
    pub fn world_to_screen(&self, x: f64, y: f64) -> Vec<f64> {
        self.session.world_to_screen(Point2::new(x, y)).to_array().to_vec()
    }

    #[wasm_bindgen]
    pub fn resize(&mut self, width: f64, height: f64) {
        self.session.resize(width, height);
    }

    #[wasm_bindgen]
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.session.pan_by(Point2::new(dx, dy));
    }

    #[wasm_bindgen]
    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.session.set_pan(Point2::new(x, y));
    }

    #[wasm_bindgen]
    pub fn set_zoom(&mut self, zoom: f64) {
        self.session.set_zoom(zoom);
    }

    /// Zoom rond een schermpunt dat op zijn plaats blijft.
    #[wasm_bindgen]
    pub fn zoom_at(&mut self, screen_x: f64, screen_y: f64, factor: f64) {
        self.session.zoom_at(Point2::new(screen_x, screen_y), factor);
    }

    #[wasm_bindgen]
    pub fn set_base_grid_size(&mut self, size: f64) {
        self.session.set_base_grid_size(size);
    }

    #[wasm_bindgen]
    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.session.set_snap_enabled(enabled);
    }

    /// Stel de snapmodus in: `grid`, `intersection` of `none`.
    #[wasm_bindgen]
    pub fn set_snap_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = parse_snap_mode(mode).ok_or_else(|| js_error("onbekende snapmodus"))?;
        self.session.set_snap_mode(mode);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_snap_strength(&mut self, strength: f64) {
        self.session.set_snap_strength(strength);
    }

    /// Maximale afstand waarbinnen een kandidaat-snijpunt aantrekt.
    #[wasm_bindgen]
    pub fn set_snap_tolerance(&mut self, tolerance: f64) {
        self.session.set_snap_tolerance(tolerance);
    }

    #[wasm_bindgen]
    pub fn set_max_active_domains(&mut self, count: usize) {
        self.session.set_max_active_domains(count);
    }

    /// Pas een (gedeeltelijke) configuratie toe; ontbrekende velden krijgen
    /// hun standaardwaarde.
    #[wasm_bindgen]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: SessionConfig = serde_wasm_bindgen::from_value(config).map_err(to_js_error)?;
        self.session.apply_config(&config);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn get_config(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.session.config()).map_err(to_js_error)
    }
}

impl GridEngine {
    fn create(&mut self, kind: &str, spec: &DomainSpec) -> Result<f64, JsValue> {
        let id = self
            .session
            .create_domain_named(kind, spec)
            .map_err(to_js_error)?;
        debug_log!("domein {id} aangemaakt ({kind})");
        Ok(domain_id_to_js(id))
    }

    /// The underlying session, for native callers.
    #[must_use]
    pub fn session(&self) -> &GridSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GridSession {
        &mut self.session
    }
}

#[allow(clippy::cast_precision_loss)]
fn domain_id_to_js(id: DomainId) -> f64 {
    id.get() as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn domain_id_from_js(id: f64) -> Option<DomainId> {
    (id.is_finite() && id >= 1.0 && id.fract() == 0.0).then(|| DomainId::new(id as u64))
}

fn parse_snap_mode(mode: &str) -> Option<SnapMode> {
    match mode.trim().to_ascii_lowercase().as_str() {
        "grid" => Some(SnapMode::Grid),
        "intersection" => Some(SnapMode::Intersection),
        "none" => Some(SnapMode::None),
        _ => None,
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen::JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
