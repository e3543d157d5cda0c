/// Turn a configured model name into the upstream resource path.
///
/// `gemini-2.5-flash` becomes `models/gemini-2.5-flash`; `models/...` and
/// `tunedModels/...` pass through; the singular `model/...` prefix is corrected.
pub fn model_resource_path(model: &str) -> String {
    let model = model.trim().trim_matches('/');
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        return model.to_string();
    }
    if let Some(rest) = model.strip_prefix("model/") {
        log::info!("🔄 Model: {} → models/{} (prefix-corrected)", model, rest);
        return format!("models/{}", rest);
    }
    format!("models/{}", model)
}
