//! Generic CRUD helpers over the API's resource collections.
//!
//! Every list view, form, and detail page of the admin dashboard talks to the API through
//! the same five calls; they only need "data or a normalized error" and never see the
//! refresh mechanics underneath.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	http::{ApiRequest, ApiTransport},
};

/// Resource collections exposed by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
	/// Bank customers whose leads are scored.
	Customers,
	/// Lead-score predictions.
	Predictions,
	/// Outreach campaigns.
	Campaigns,
	/// Dashboard users.
	Users,
}
impl Resource {
	/// Collection path of the resource.
	pub const fn path(self) -> &'static str {
		match self {
			Resource::Customers => "/customers",
			Resource::Predictions => "/predictions",
			Resource::Campaigns => "/campaigns",
			Resource::Users => "/users",
		}
	}

	/// Path of a single member of the collection; `id` is percent-encoded as one segment.
	pub fn member_path(self, id: &str) -> String {
		let mut path = format!("{}/", self.path());

		for byte in id.bytes() {
			if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
				path.push(char::from(byte));
			} else {
				path.push_str(&format!("%{byte:02X}"));
			}
		}

		path
	}
}
impl Display for Resource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.path().trim_start_matches('/'))
	}
}

/// CRUD handle for one [`Resource`], borrowed from an [`ApiClient`].
///
/// The handle is `Copy`, and every call consumes a copy, so futures for several resources
/// can be awaited together (`tokio::try_join!`) straight off `client.customers()` and friends.
pub struct ResourceClient<'a, T>
where
	T: ?Sized + ApiTransport,
{
	client: &'a ApiClient<T>,
	resource: Resource,
}
impl<T> Clone for ResourceClient<'_, T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		*self
	}
}
impl<T> Copy for ResourceClient<'_, T> where T: ?Sized + ApiTransport {}
impl<'a, T> ResourceClient<'a, T>
where
	T: ?Sized + ApiTransport,
{
	/// Resource this handle addresses.
	pub fn resource(self) -> Resource {
		self.resource
	}

	/// Lists the collection, forwarding `query` pairs (filters, pagination) verbatim.
	pub async fn list<R>(self, query: &[(&str, &str)]) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let request = query
			.iter()
			.fold(ApiRequest::get(self.resource.path()), |request, (key, value)| {
				request.with_query(*key, *value)
			});

		self.client.fetch(request).await
	}

	/// Fetches one member.
	pub async fn get<R>(self, id: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.client.fetch(ApiRequest::get(self.resource.member_path(id))).await
	}

	/// Creates a member from `body`.
	pub async fn create<B, R>(self, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let request = ApiRequest::post(self.resource.path()).with_json(body)?;

		self.client.fetch(request).await
	}

	/// Partially updates a member with `body`.
	pub async fn update<B, R>(self, id: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let request = ApiRequest::patch(self.resource.member_path(id)).with_json(body)?;

		self.client.fetch(request).await
	}

	/// Deletes a member. The response body, if any, is ignored.
	pub async fn delete(self, id: &str) -> Result<()> {
		self.client.send(ApiRequest::delete(self.resource.member_path(id))).await.map(|_| ())
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Returns a CRUD handle for `resource`.
	pub fn resource(&self, resource: Resource) -> ResourceClient<'_, T> {
		ResourceClient { client: self, resource }
	}

	/// Shorthand for [`Resource::Customers`].
	pub fn customers(&self) -> ResourceClient<'_, T> {
		self.resource(Resource::Customers)
	}

	/// Shorthand for [`Resource::Predictions`].
	pub fn predictions(&self) -> ResourceClient<'_, T> {
		self.resource(Resource::Predictions)
	}

	/// Shorthand for [`Resource::Campaigns`].
	pub fn campaigns(&self) -> ResourceClient<'_, T> {
		self.resource(Resource::Campaigns)
	}

	/// Shorthand for [`Resource::Users`].
	pub fn users(&self) -> ResourceClient<'_, T> {
		self.resource(Resource::Users)
	}
}
