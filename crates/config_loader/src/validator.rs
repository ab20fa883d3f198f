//! 配置校验模块
//!
//! 校验规则：
//! - 至少配置一个 sink
//! - sink 名称非空且唯一
//! - addr 为 http/https 绝对 URL
//! - timeout_ms > 0 (若设置)
//! - queue_capacity >= 1
//! - 额外请求头不得覆盖 Content-Type

use std::collections::HashSet;

use contracts::{ContractError, PipelineBlueprint, SinkConfig};
use ::validator::Validate;

/// 校验 PipelineBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    validate_not_empty(blueprint)?;
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        validate_sink_fields(idx, sink)?;
        validate_addr_scheme(idx, sink)?;
        validate_timeout(idx, sink)?;
        validate_headers(idx, sink)?;
    }
    validate_sink_names(blueprint)?;
    Ok(())
}

/// 校验 sink 列表非空
fn validate_not_empty(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    if blueprint.sinks.is_empty() {
        return Err(ContractError::config_validation(
            "sinks",
            "at least one sink must be configured",
        ));
    }
    Ok(())
}

/// 派生规则校验 (name / addr / queue_capacity)
fn validate_sink_fields(idx: usize, sink: &SinkConfig) -> Result<(), ContractError> {
    let Err(errors) = sink.validate() else {
        return Ok(());
    };

    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let (field, errs) = fields
        .into_iter()
        .next()
        .ok_or_else(|| ContractError::config_validation(format!("sinks[{idx}]"), "invalid"))?;
    let message = errs
        .iter()
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| format!("invalid value for '{field}'"));

    Err(ContractError::config_validation(
        format!("sinks[{idx}].{field}"),
        message,
    ))
}

/// 校验 addr 协议
fn validate_addr_scheme(idx: usize, sink: &SinkConfig) -> Result<(), ContractError> {
    let addr = sink.addr.to_ascii_lowercase();
    if !(addr.starts_with("http://") || addr.starts_with("https://")) {
        return Err(ContractError::config_validation(
            format!("sinks[{idx}].addr"),
            format!("addr must use http or https, got '{}'", sink.addr),
        ));
    }
    Ok(())
}

/// 校验超时
fn validate_timeout(idx: usize, sink: &SinkConfig) -> Result<(), ContractError> {
    if sink.timeout_ms == Some(0) {
        return Err(ContractError::config_validation(
            format!("sinks[{idx}].timeout_ms"),
            "timeout_ms must be > 0 when set",
        ));
    }
    Ok(())
}

/// 校验额外请求头
fn validate_headers(idx: usize, sink: &SinkConfig) -> Result<(), ContractError> {
    for key in sink.headers.keys() {
        if key.eq_ignore_ascii_case("content-type") {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].headers.{key}"),
                "content-type is fixed by the sink type",
            ));
        }
    }
    Ok(())
}

/// 校验 sink 名称唯一性
fn validate_sink_names(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for sink in &blueprint.sinks {
        if !seen.insert(&sink.name) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}
