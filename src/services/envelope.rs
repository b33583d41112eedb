//! # 응답 봉투(envelope) 풀기
//!
//! 원격 API 게이트웨이는 응답을 두 가지 형태로 돌려줍니다:
//!
//! ```text
//! 직접 형태:  { "trip": { ... } }
//! 봉투 형태:  { "statusCode": 200, "body": "{\"trip\": {...}}" }
//!                                     └─ 문자열로 한 번 더 인코딩되기도 함
//! ```
//!
//! 모든 원격 호출은 `unwrap_provider_response` 하나를 거쳐서,
//! 호출하는 쪽은 항상 안쪽의 도메인 객체만 받습니다.

use serde_json::Value;

use crate::error::SyncError;

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// 에러 본문에서 서버가 준 메시지를 찾습니다.
///
/// `error`, `message`, `details` 순서로 보고,
/// `error`가 객체면 그 안의 `message`를 씁니다.
pub fn server_message(body: &Value) -> Option<String> {
    let candidates = [
        body.get("error").and_then(|e| e.get("message")),
        body.get("error"),
        body.get("message"),
        body.get("details"),
    ];

    candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str().filter(|m| !m.trim().is_empty()))
        .map(str::to_string)
}

fn default_message(status: u16) -> String {
    match status {
        401 => "Not signed in with the trip service".to_string(),
        403 => "You do not have permission to access this trip".to_string(),
        404 => "The requested resource was not found".to_string(),
        _ => format!("Unexpected response status {}", status),
    }
}

fn failure(status: u16, body: Option<&Value>) -> SyncError {
    SyncError::RemoteCallFailed {
        status,
        message: body
            .and_then(server_message)
            .unwrap_or_else(|| default_message(status)),
    }
}

/// 봉투 형태라면 (안쪽 상태 코드, 본문)을 돌려줍니다.
fn envelope_parts(outer: &Value) -> Option<(u16, &Value)> {
    let status = outer.get("statusCode")?.as_u64()?;
    let body = outer.get("body")?;
    Some((u16::try_from(status).unwrap_or(500), body))
}

/// 원격 응답의 상태 코드와 본문을 받아 안쪽 도메인 객체를 꺼냅니다.
///
/// - HTTP 상태나 봉투 안의 `statusCode`가 2xx가 아니면 `RemoteCallFailed`
/// - 본문이 JSON이 아니거나, 봉투의 문자열 본문이 JSON이 아니면 `RemoteCallFailed`
/// - `member`가 주어지면 그 이름의 필드를 꺼내고, 없거나 null이면 객체 전체를 돌려줍니다.
///   (`{ "trip": {...} }`와 `{...}`를 똑같이 취급)
pub fn unwrap_provider_response(
    status: u16,
    raw: &[u8],
    member: Option<&str>,
) -> Result<Value, SyncError> {
    let parsed: Option<Value> = serde_json::from_slice(raw).ok();

    if !is_success(status) {
        // 봉투에 싸인 에러도 메시지를 꺼내 봅니다.
        let inner = parsed.as_ref().and_then(|outer| {
            envelope_parts(outer).and_then(|(_, body)| match body {
                Value::String(s) => serde_json::from_str(s).ok(),
                other => Some(other.clone()),
            })
        });
        return Err(failure(status, inner.as_ref().or(parsed.as_ref())));
    }

    let outer = parsed.ok_or_else(|| SyncError::RemoteCallFailed {
        status,
        message: "Response body is not valid JSON".to_string(),
    })?;

    let inner = match envelope_parts(&outer) {
        Some((inner_status, body)) => {
            let body = match body {
                Value::String(s) if s.trim().is_empty() => Value::Null,
                Value::String(s) => {
                    serde_json::from_str(s).map_err(|e| SyncError::RemoteCallFailed {
                        status: inner_status,
                        message: format!("Envelope body is not valid JSON: {}", e),
                    })?
                }
                other => other.clone(),
            };
            if !is_success(inner_status) {
                return Err(failure(inner_status, Some(&body)));
            }
            body
        }
        None => outer,
    };

    Ok(select_member(inner, member))
}

fn select_member(value: Value, member: Option<&str>) -> Value {
    let Some(name) = member else {
        return value;
    };
    match value {
        Value::Object(mut map) => match map.remove(name) {
            Some(found) if !found.is_null() => found,
            Some(found) => {
                map.insert(name.to_string(), found);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trip() -> Value {
        json!({ "id": "t1", "start_city": "Paris", "duration": 3 })
    }

    #[test]
    fn direct_and_enveloped_bodies_unwrap_identically() {
        let direct = serde_json::to_vec(&json!({ "trip": trip() })).unwrap();
        let wrapped = serde_json::to_vec(&json!({
            "statusCode": 200,
            "body": json!({ "trip": trip() }).to_string(),
        }))
        .unwrap();
        let wrapped_object = serde_json::to_vec(&json!({
            "statusCode": 200,
            "body": { "trip": trip() },
        }))
        .unwrap();
        let bare = serde_json::to_vec(&trip()).unwrap();

        let expected = unwrap_provider_response(200, &direct, Some("trip")).unwrap();
        assert_eq!(expected, trip());
        assert_eq!(unwrap_provider_response(200, &wrapped, Some("trip")).unwrap(), expected);
        assert_eq!(
            unwrap_provider_response(200, &wrapped_object, Some("trip")).unwrap(),
            expected
        );
        assert_eq!(unwrap_provider_response(200, &bare, Some("trip")).unwrap(), expected);
    }

    #[test]
    fn http_failure_carries_status_and_server_message() {
        let body = serde_json::to_vec(&json!({ "error": "User email not provided" })).unwrap();
        match unwrap_provider_response(401, &body, Some("trip")) {
            Err(SyncError::RemoteCallFailed { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "User email not provided");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn inner_status_code_failure_is_reported() {
        let body = serde_json::to_vec(&json!({
            "statusCode": 403,
            "body": json!({ "error": "You do not have permission to edit this trip" }).to_string(),
        }))
        .unwrap();
        match unwrap_provider_response(200, &body, None) {
            Err(SyncError::RemoteCallFailed { status, message }) => {
                assert_eq!(status, 403);
                assert!(message.contains("permission"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unparseable_bodies_fail_with_upstream_status() {
        let err = unwrap_provider_response(200, b"<html>gateway</html>", None).unwrap_err();
        assert_eq!(err.status(), Some(200));

        let broken = serde_json::to_vec(&json!({ "statusCode": 200, "body": "{not json" })).unwrap();
        assert!(unwrap_provider_response(200, &broken, None).is_err());

        let err = unwrap_provider_response(502, b"Bad Gateway", None).unwrap_err();
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn null_member_falls_back_to_whole_object() {
        let body = serde_json::to_vec(&json!({ "trip": null, "id": "t1" })).unwrap();
        let value = unwrap_provider_response(200, &body, Some("trip")).unwrap();
        assert_eq!(value["id"], json!("t1"));
    }

    #[test]
    fn finds_nested_error_messages() {
        assert_eq!(
            server_message(&json!({ "error": { "message": "nested" } })).as_deref(),
            Some("nested")
        );
        assert_eq!(
            server_message(&json!({ "details": "db down" })).as_deref(),
            Some("db down")
        );
        assert_eq!(server_message(&json!({ "error": "" })), None);
    }
}
