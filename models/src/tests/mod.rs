mod access_token;
mod tool_response;
