// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Platform classification of stack traces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;
use crate::frame::StackFrame;

const RELATIVE_BASE: &str = "http://bundle.invalid/";

/// Target platform a bundle was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
	Ios,
	Android,
	Web,
}

impl Platform {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Ios => "ios",
			Self::Android => "android",
			Self::Web => "web",
		}
	}

	/// Platform signalled by a single bundle URL, if any.
	///
	/// Checked in order: a `platform=` query parameter, a path segment naming
	/// the platform, then a `<name>.<platform>.bundle` / `.js` file name.
	pub fn from_bundle_url(bundle_url: &str) -> Option<Self> {
		let url = Url::parse(bundle_url)
			.or_else(|_| Url::parse(RELATIVE_BASE).and_then(|base| base.join(bundle_url)))
			.ok()?;

		if let Some((_, value)) = url.query_pairs().find(|(key, _)| key == "platform") {
			return value.parse().ok();
		}

		let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
		let (file_name, dirs) = segments.split_last()?;

		if let Some(platform) = dirs.iter().find_map(|dir| dir.parse::<Self>().ok()) {
			return Some(platform);
		}

		let stem = file_name
			.strip_suffix(".bundle")
			.or_else(|| file_name.strip_suffix(".js"))?;
		let (_, suffix) = stem.rsplit_once('.')?;
		suffix.parse().ok()
	}
}

impl fmt::Display for Platform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Platform {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"ios" => Ok(Self::Ios),
			"android" => Ok(Self::Android),
			"web" => Ok(Self::Web),
			_ => Err(CoreError::InvalidPlatform(s.to_string())),
		}
	}
}

/// Derive the platform a stack trace came from.
///
/// Frames without a platform signal are ignored. Returns `None` when no frame
/// carries a signal or when signals disagree.
pub fn infer_platform_from_stack(frames: &[StackFrame]) -> Option<Platform> {
	let mut inferred = None;
	for platform in frames
		.iter()
		.filter_map(|frame| Platform::from_bundle_url(&frame.bundle_url))
	{
		match inferred {
			None => inferred = Some(platform),
			Some(existing) if existing != platform => return None,
			Some(_) => {}
		}
	}
	inferred
}
