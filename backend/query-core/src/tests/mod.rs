mod query_client;
