#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
// self
use leadscore_client::error::Error;

#[derive(Debug, PartialEq, Deserialize)]
struct Customer {
	id: u64,
	name: String,
	segment: String,
}

#[derive(Serialize)]
struct CampaignDraft<'a> {
	name: &'a str,
	channel: &'a str,
}

#[derive(Debug, PartialEq, Deserialize)]
struct Campaign {
	id: u64,
	name: String,
	status: String,
}

#[tokio::test]
async fn list_forwards_query_and_decodes_the_envelope() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/customers")
				.query_param("segment", "mortgage")
				.query_param("page", "2");
			then.status(200).json_body(json!({
				"data": [{ "id": 3, "name": "Northwind Credit", "segment": "mortgage" }]
			}));
		})
		.await;
	let (client, _, _) = common::reqwest_client(&server.url("/api"), Some("current"), "/dashboard");
	let customers: Vec<Customer> = client
		.customers()
		.list(&[("segment", "mortgage"), ("page", "2")])
		.await
		.expect("Customer list should decode.");

	assert_eq!(
		customers,
		vec![Customer { id: 3, name: "Northwind Credit".into(), segment: "mortgage".into() }]
	);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn create_update_and_delete_use_the_right_verbs() {
	let server = MockServer::start_async().await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/campaigns")
				.header("content-type", "application/json")
				.json_body(json!({ "name": "Q3 mortgage push", "channel": "email" }));
			then.status(201)
				.json_body(json!({ "data": { "id": 11, "name": "Q3 mortgage push", "status": "draft" } }));
		})
		.await;
	let update = server
		.mock_async(|when, then| {
			when.method(PATCH).path("/api/campaigns/11").json_body(json!({ "status": "active" }));
			then.status(200)
				.json_body(json!({ "data": { "id": 11, "name": "Q3 mortgage push", "status": "active" } }));
		})
		.await;
	let delete = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/campaigns/11");
			then.status(204);
		})
		.await;
	let (client, _, _) = common::reqwest_client(&server.url("/api"), Some("current"), "/dashboard");
	let campaigns = client.campaigns();
	let created: Campaign = campaigns
		.create(&CampaignDraft { name: "Q3 mortgage push", channel: "email" })
		.await
		.expect("Campaign should be created.");
	let updated: Campaign = campaigns
		.update("11", &json!({ "status": "active" }))
		.await
		.expect("Campaign should be updated.");

	campaigns.delete("11").await.expect("Campaign should be deleted.");

	assert_eq!(created.status, "draft");
	assert_eq!(updated, Campaign { id: 11, name: "Q3 mortgage push".into(), status: "active".into() });

	create.assert_calls_async(1).await;
	update.assert_calls_async(1).await;
	delete.assert_calls_async(1).await;
}

#[tokio::test]
async fn get_surfaces_api_and_decode_errors() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/predictions/missing");
			then.status(404).json_body(json!({ "data": { "message": "Prediction not found" } }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/customers/5");
			then.status(200).json_body(json!({ "data": { "id": "five", "name": "x", "segment": "y" } }));
		})
		.await;

	let (client, _, _) = common::reqwest_client(&server.url("/api"), Some("current"), "/dashboard");
	let missing = client
		.predictions()
		.get::<serde_json::Value>("missing")
		.await
		.expect_err("Missing prediction should fail.");

	assert!(matches!(&missing, Error::Api { status: 404, message } if message == "Prediction not found"));

	let malformed = client
		.customers()
		.get::<Customer>("5")
		.await
		.expect_err("Wrong id type should fail to decode.");

	match malformed {
		Error::Decode { source, status } => {
			assert_eq!(status, 200);
			assert_eq!(source.path().to_string(), "data.id");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn handles_for_several_resources_can_be_joined() {
	let server = MockServer::start_async().await;

	for (path, body) in [
		("/api/customers/3", json!({ "data": { "id": 3, "name": "Northwind Credit", "segment": "sme" } })),
		("/api/campaigns/11", json!({ "data": { "id": 11, "name": "Q3 mortgage push", "status": "active" } })),
	] {
		server
			.mock_async(|when, then| {
				when.method(GET).path(path).header("authorization", "Bearer current");
				then.status(200).json_body(body);
			})
			.await;
	}

	let (client, _, _) = common::reqwest_client(&server.url("/api"), Some("current"), "/dashboard");
	let (customer, campaign) = tokio::try_join!(
		client.customers().get::<Customer>("3"),
		client.campaigns().get::<Campaign>("11"),
	)
	.expect("Joined resource calls should succeed.");

	assert_eq!(customer.segment, "sme");
	assert_eq!(campaign.status, "active");
}
