// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write operations. Callers own the surrounding transaction.

pub mod access_paths;
pub mod activation;
pub mod enrollment;
