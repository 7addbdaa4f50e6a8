// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-specific connection setup.
//!
//! Queries and mutations are written in Diesel DSL; only connection
//! initialization and PRAGMA handling live here.

pub mod sqlite;
