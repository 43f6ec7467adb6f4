//! Constantes del motor core.
//!
//! `ENGINE_VERSION` forma parte del input del fingerprint de cada ejecución:
//! cambiarla invalida los fingerprints previos aunque la definición y las
//! salidas no cambien.

pub const ENGINE_VERSION: &str = "FM1.0";

/// Tope de transiciones por ejecución; protege contra grafos con ciclos.
pub const MAX_TRANSITIONS: usize = 10_000;
