//! Handlers backed by public JSON APIs.
//!
//! Each one issues a single GET through the shared [`JsonFetcher`], reads
//! one JSON pointer and formats a one-line reply.
//!
//! [`JsonFetcher`]: crate::http::JsonFetcher

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use crate::commands::context::{CommandContext, CommandHandler};
use crate::error::{CommandError, CommandResult};
use crate::http::{json_f64, json_str};

const WEATHER_URL: &str = "http://api.openweathermap.org/data/2.5/weather";
const ICNDB_URL: &str = "http://api.icndb.com/jokes/random";
const WEBKNOX_URL: &str = "http://webknox.com/api/jokes/random";
const QUOTE_URL: &str = "http://q.uote.me/api.php?p=json&l=1&s=random";

const KELVIN_OFFSET: f64 = 273.15;

/// GET `url` and map any failure onto `source_name`.
async fn fetch(ctx: &CommandContext, source_name: &str, url: &str) -> Result<Value, CommandError> {
    ctx.bot
        .json
        .get_json(url)
        .await
        .map_err(|e| CommandError::upstream(source_name, e))
}

fn celsius(kelvin: f64) -> i64 {
    (kelvin - KELVIN_OFFSET).floor() as i64
}

/// `weather <city>`
pub struct WeatherHandler;

#[async_trait]
impl CommandHandler for WeatherHandler {
    async fn handle(&self, args: &str, ctx: &CommandContext) -> CommandResult {
        let key = &ctx.bot.config.openweathermap.api_key;
        if key.is_empty() {
            return Err(CommandError::MissingKey("openweather"));
        }
        let city = args.trim();
        if city.is_empty() {
            let usage = format!("Usage: {}weather <ville>", ctx.bot.table.sigil());
            return Err(CommandError::Usage(usage));
        }

        let url = Url::parse_with_params(WEATHER_URL, [("q", city), ("APPID", key.as_str())])
            .map_err(|_| CommandError::InvalidArgument)?;
        let body = fetch(ctx, "openweathermap", url.as_str()).await?;

        let read = |pointer: &str| {
            json_f64(&body, pointer).map_err(|e| CommandError::upstream("openweathermap", e))
        };
        let temp = celsius(read("/main/temp")?);
        let min = celsius(read("/main/temp_min")?);
        let max = celsius(read("/main/temp_max")?);
        let name = json_str(&body, "/name").map_err(|e| CommandError::upstream("openweathermap", e))?;

        Ok(format!(
            "La température à {name} est de {temp} degrès. (min : {min} max : {max})"
        ))
    }
}

/// `chuck_norris`
pub struct ChuckNorrisHandler;

#[async_trait]
impl CommandHandler for ChuckNorrisHandler {
    async fn handle(&self, _args: &str, ctx: &CommandContext) -> CommandResult {
        let body = fetch(ctx, "icndb", ICNDB_URL).await?;
        let joke = json_str(&body, "/value/joke").map_err(|e| CommandError::upstream("icndb", e))?;
        Ok(joke.to_string())
    }
}

/// `joke`
pub struct JokeHandler;

#[async_trait]
impl CommandHandler for JokeHandler {
    async fn handle(&self, _args: &str, ctx: &CommandContext) -> CommandResult {
        let key = &ctx.bot.config.webknox.api_key;
        if key.is_empty() {
            return Err(CommandError::MissingKey("webknox"));
        }
        let url = Url::parse_with_params(WEBKNOX_URL, [("apiKey", key.as_str())])
            .map_err(|_| CommandError::InvalidArgument)?;
        let body = fetch(ctx, "webknox", url.as_str()).await?;
        let joke = json_str(&body, "/joke").map_err(|e| CommandError::upstream("webknox", e))?;
        Ok(joke.to_string())
    }
}

/// `quote`
pub struct QuoteHandler;

#[async_trait]
impl CommandHandler for QuoteHandler {
    async fn handle(&self, _args: &str, ctx: &CommandContext) -> CommandResult {
        let body = fetch(ctx, "quote", QUOTE_URL).await?;
        let text = json_str(&body, "/data/0/text").map_err(|e| CommandError::upstream("quote", e))?;
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::handlers::test_support::{StubJson, bot_with, config, in_channel};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_weather_without_key_makes_no_call() {
        let json = Arc::new(StubJson::returning(json!({})));
        let bot = bot_with(config(), json.clone(), Arc::default());
        let err = WeatherHandler
            .handle("Paris", &in_channel(&bot, "ada"))
            .await
            .unwrap_err();
        assert_eq!(err.reply(), "Key openweather doesn't exist !");
        assert_eq!(json.calls(), 0);
    }

    #[tokio::test]
    async fn test_weather_formats_celsius() {
        let mut cfg = config();
        cfg.openweathermap.api_key = "k".into();
        let json = Arc::new(StubJson::returning(json!({
            "name": "Paris",
            "main": { "temp": 290.0, "temp_min": 285.5, "temp_max": 293.9 }
        })));
        let bot = bot_with(cfg, json.clone(), Arc::default());

        let reply = WeatherHandler
            .handle("Paris", &in_channel(&bot, "ada"))
            .await
            .unwrap();
        assert_eq!(
            reply,
            "La température à Paris est de 16 degrès. (min : 12 max : 20)"
        );

        let urls = json.urls.lock();
        assert_eq!(
            urls[0],
            "http://api.openweathermap.org/data/2.5/weather?q=Paris&APPID=k"
        );
    }

    #[tokio::test]
    async fn test_weather_requires_city() {
        let mut cfg = config();
        cfg.openweathermap.api_key = "k".into();
        let bot = bot_with(cfg, Arc::default(), Arc::default());
        let err = WeatherHandler
            .handle("  ", &in_channel(&bot, "ada"))
            .await
            .unwrap_err();
        assert_eq!(err.reply(), "Usage: .weather <ville>");
    }

    #[tokio::test]
    async fn test_joke_and_quote_paths() {
        let json = Arc::new(StubJson::returning(json!({
            "joke": "knock knock",
            "value": { "joke": "Chuck counted to infinity. Twice." },
            "data": [{ "text": "carpe diem" }]
        })));
        let bot = bot_with(config(), json.clone(), Arc::default());
        let ctx = in_channel(&bot, "ada");

        assert_eq!(JokeHandler.handle("", &ctx).await.unwrap(), "knock knock");
        assert_eq!(
            ChuckNorrisHandler.handle("", &ctx).await.unwrap(),
            "Chuck counted to infinity. Twice."
        );
        assert_eq!(QuoteHandler.handle("", &ctx).await.unwrap(), "carpe diem");
        assert_eq!(
            json.urls.lock()[0],
            "http://webknox.com/api/jokes/random?apiKey=knox"
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_is_one_generic_line() {
        let bot = bot_with(config(), Arc::default(), Arc::default());
        let err = QuoteHandler
            .handle("", &in_channel(&bot, "ada"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "upstream");
        assert_eq!(err.reply(), "Unable to reach quote.");
    }

    #[tokio::test]
    async fn test_missing_field_is_upstream_error() {
        let json = Arc::new(StubJson::returning(json!({ "unexpected": true })));
        let bot = bot_with(config(), json, Arc::default());
        let err = ChuckNorrisHandler
            .handle("", &in_channel(&bot, "ada"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Upstream { .. }));
    }
}
