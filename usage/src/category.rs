use db::models::consulta::ConsultaTipo;

/// Resolves the alternate spellings accepted by the query API.
fn resolve_alias(slug: &str) -> &str {
    match slug {
        "dni" | "dniperu" => "dni_peru",
        "dni_nombres" | "dni_propietario" | "dni_por_nombre" => "dni_nombre",
        "lic" | "mtc_licencia" => "licencia",
        other => other,
    }
}

/// Canonical form of a service key: trimmed, lowercase, `_` separated, aliases resolved.
pub fn normalize_service_key(service_key: &str) -> String {
    let slug = service_key.trim().to_lowercase().replace('-', "_");
    resolve_alias(&slug).to_string()
}

/// Maps an external service key to the category its log rows are filed under.
///
/// Total over all inputs: unknown keys (including the empty string) fall
/// back to [`ConsultaTipo::Vehicular`], the general plate lookup.
pub fn map_service_to_consulta_tipo(service_key: &str) -> ConsultaTipo {
    match normalize_service_key(service_key).as_str() {
        "sunarp" | "vehicular" | "consulta_vehicular" | "vehicular_full" => {
            ConsultaTipo::Vehicular
        }
        "soat" => ConsultaTipo::Soat,
        "revision" | "itv" | "citv" => ConsultaTipo::Revision,
        "sat" | "sat_callao" | "sutran" => ConsultaTipo::Papeletas,
        "licencia" => ConsultaTipo::Licencia,
        "dni_peru" | "dni_nombre" => ConsultaTipo::Dni,
        "redam" => ConsultaTipo::Redam,
        "recompensas" => ConsultaTipo::Recompensas,
        _ => ConsultaTipo::default(),
    }
}
