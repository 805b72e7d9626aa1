// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod card;
pub mod data;
pub mod doctor;
pub mod entries;
pub mod reports;
pub mod workouts;
