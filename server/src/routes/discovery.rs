//! API discovery documents.
//!
//! Describes the objects resource in the discovery format so generic API
//! clients can bind to the server. URLs are built from the request's Host
//! header.

use axum::{
    http::{header::HOST, HeaderMap},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::AppState;

const API_NAME: &str = "datastore";
const API_VERSION: &str = "v1";
const REST_PATH: &str = "/discovery/v1/apis/datastore/v1/rest";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(REST_PATH, get(rest_description))
        .route("/discovery/v1/apis", get(directory))
}

fn root_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}/")
}

fn path_param(description: &str) -> Value {
    json!({"type": "string", "required": true, "location": "path", "description": description})
}

fn method(id: &str, http_method: &str, path: &str, with_id: bool, body: bool) -> Value {
    let mut parameters = json!({ "kind": path_param("Kind of the object.") });
    let mut order = vec!["kind"];
    if with_id {
        parameters["id"] = path_param("ID of the object.");
        order.push("id");
    }

    let mut method = json!({
        "id": format!("{API_NAME}.objects.{id}"),
        "httpMethod": http_method,
        "path": path,
        "parameters": parameters,
        "parameterOrder": order,
        "response": {"$ref": "DataObject"},
    });
    if body {
        method["request"] = json!({"$ref": "DataObject"});
    }
    method
}

fn list_method() -> Value {
    let mut list = method("list", "GET", "{kind}", false, false);
    let query = |description: &str| {
        json!({"type": "string", "location": "query", "description": description})
    };

    list["parameters"]["limit"] = json!({
        "type": "integer",
        "location": "query",
        "description": "Maximum number of objects to return."
    });
    list["parameters"]["start"] = query("Token to resume after.");
    list["parameters"]["end"] = query("Token to stop at.");
    list["parameters"]["sort"] = query("Property to sort by; prefix with '-' for descending.");
    list["parameters"]["where"] = json!({
        "type": "string",
        "location": "query",
        "repeated": true,
        "description": "Equality filter of the form property=value."
    });
    list["response"] = json!({"$ref": "DataObjectList"});
    list
}

/// GET /discovery/v1/apis/datastore/v1/rest
async fn rest_description(headers: HeaderMap) -> Json<Value> {
    let root = root_url(&headers);
    Json(json!({
        "kind": "discovery#restDescription",
        "discoveryVersion": "v1",
        "id": format!("{API_NAME}:{API_VERSION}"),
        "name": API_NAME,
        "canonicalName": "Datastore",
        "version": API_VERSION,
        "title": "Datastore API",
        "description": "Simple REST access to a schema-less document store",
        "protocol": "rest",
        "rootUrl": root,
        "servicePath": "objects/",
        "baseUrl": format!("{root}objects/"),
        "basePath": "/objects/",
        "parameters": {
            "access_token": {
                "type": "string",
                "description": "Access token selecting the caller's namespace.",
                "location": "query"
            }
        },
        "schemas": {
            "DataObject": {
                "id": "DataObject",
                "type": "object",
                "properties": {
                    "_id": {"type": "string", "description": "Unique ID of this object."},
                    "_created": {
                        "type": "integer",
                        "format": "int64",
                        "description": "Seconds since the epoch when the object was created."
                    },
                    "_updated": {
                        "type": "integer",
                        "format": "int64",
                        "description": "Seconds since the epoch when the object was last replaced."
                    }
                },
                "additionalProperties": {"type": "any"}
            },
            "DataObjectList": {
                "id": "DataObjectList",
                "type": "object",
                "properties": {
                    "items": {"type": "array", "items": {"$ref": "DataObject"}},
                    "nextStartToken": {"type": "string"}
                }
            }
        },
        "resources": {
            "objects": {
                "methods": {
                    "insert": method("insert", "POST", "{kind}", false, true),
                    "list": list_method(),
                    "get": method("get", "GET", "{kind}/{id}", true, false),
                    "update": method("update", "POST", "{kind}/{id}", true, true),
                    "delete": method("delete", "DELETE", "{kind}/{id}", true, false),
                }
            }
        }
    }))
}

/// GET /discovery/v1/apis
async fn directory(headers: HeaderMap) -> Json<Value> {
    let root = root_url(&headers);
    Json(json!({
        "kind": "discovery#directoryList",
        "discoveryVersion": "v1",
        "items": [{
            "kind": "discovery#directoryItem",
            "id": format!("{API_NAME}:{API_VERSION}"),
            "name": API_NAME,
            "version": API_VERSION,
            "title": "Datastore API",
            "description": "Simple REST access to a schema-less document store",
            "discoveryRestUrl": format!("{}{}", root.trim_end_matches('/'), REST_PATH),
            "discoveryLink": "./apis/datastore/v1/rest",
            "preferred": true
        }]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_carry_their_parameters() {
        let get = method("get", "GET", "{kind}/{id}", true, false);
        assert_eq!(get["id"], "datastore.objects.get");
        assert_eq!(get["parameterOrder"], json!(["kind", "id"]));
        assert!(get.get("request").is_none());

        let insert = method("insert", "POST", "{kind}", false, true);
        assert_eq!(insert["parameterOrder"], json!(["kind"]));
        assert_eq!(insert["request"]["$ref"], "DataObject");
    }

    #[test]
    fn list_documents_query_parameters() {
        let list = list_method();
        for name in ["limit", "start", "end", "sort", "where"] {
            assert_eq!(list["parameters"][name]["location"], "query", "{name}");
        }
        assert_eq!(list["parameters"]["where"]["repeated"], true);
    }

    #[test]
    fn root_url_follows_host_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(root_url(&headers), "http://localhost/");
        headers.insert(HOST, "example.com:8080".parse().unwrap());
        assert_eq!(root_url(&headers), "http://example.com:8080/");
    }
}
