//! GLSL ES 1.00 sources for the ray background.
//!
//! Both fragment programs share one uniform interface so the GL side does not
//! care which variant it drew.

use crate::config::RayVariant;

/// One oversized triangle covering all of clip space.
pub const FULLSCREEN_TRIANGLE: [f32; 6] = [-1.0, -1.0, 3.0, -1.0, -1.0, 3.0];

pub const POSITION_ATTRIBUTE: &str = "a_position";

pub const U_TIME: &str = "u_time";
pub const U_RESOLUTION: &str = "u_resolution";
pub const U_POINTER: &str = "u_pointer";
pub const U_COLOR: &str = "u_color";
pub const U_SPREAD: &str = "u_spread";
pub const U_RAY_LENGTH: &str = "u_ray_length";
pub const U_DISTORTION: &str = "u_distortion";
pub const U_MOUSE_INFLUENCE: &str = "u_mouse_influence";
pub const U_SATURATION: &str = "u_saturation";

pub const UNIFORM_NAMES: [&str; 9] = [
    U_TIME,
    U_RESOLUTION,
    U_POINTER,
    U_COLOR,
    U_SPREAD,
    U_RAY_LENGTH,
    U_DISTORTION,
    U_MOUSE_INFLUENCE,
    U_SATURATION,
];

pub const VERTEX_SHADER: &str = r#"
attribute vec2 a_position;
varying vec2 v_uv;

void main() {
    v_uv = a_position * 0.5 + 0.5;
    gl_Position = vec4(a_position, 0.0, 1.0);
}
"#;

pub const FRAGMENT_CONE: &str = r#"
precision highp float;

uniform float u_time;
uniform vec2 u_resolution;
uniform vec2 u_pointer;
uniform vec3 u_color;
uniform float u_spread;
uniform float u_ray_length;
uniform float u_distortion;
uniform float u_mouse_influence;
uniform float u_saturation;

varying vec2 v_uv;

#define PI 3.14159265359
#define NUM_RAYS 12.0

float hash(vec2 p) {
    return fract(sin(dot(p, vec2(127.1, 311.7))) * 43758.5453);
}

float noise(vec2 p) {
    vec2 i = floor(p);
    vec2 f = fract(p);
    f = f * f * (3.0 - 2.0 * f);
    return mix(
        mix(hash(i), hash(i + vec2(1.0, 0.0)), f.x),
        mix(hash(i + vec2(0.0, 1.0)), hash(i + vec2(1.0, 1.0)), f.x),
        f.y
    );
}

void main() {
    float aspect = u_resolution.x / u_resolution.y;

    // source just above the top edge, nudged by the pointer
    vec2 source = vec2(0.5, -0.05);
    source.x += (u_pointer.x - 0.5) * u_mouse_influence * 0.3;

    vec2 uv = vec2(v_uv.x, 1.0 - v_uv.y);
    vec2 toPixel = uv - source;
    toPixel.x *= aspect;

    if (toPixel.y < 0.0) {
        gl_FragColor = vec4(0.0);
        return;
    }

    float dist = length(toPixel);
    float angle = atan(toPixel.x, toPixel.y);
    float t = u_time * 0.12;
    float rays = 0.0;

    for (float i = 0.0; i < NUM_RAYS; i++) {
        float rayAngle = (i - NUM_RAYS * 0.5) / NUM_RAYS * PI * 0.6;
        rayAngle += sin(i * 1.7 + t * 2.0) * u_distortion * 0.4;
        rayAngle += (noise(vec2(i * 0.5, t)) - 0.5) * u_distortion * 0.6;

        float rayDist = abs(angle - rayAngle);
        float rayWidth = 0.025 * u_spread * 0.4 * (0.6 + hash(vec2(i, 0.0)) * 0.8);
        float ray = smoothstep(rayWidth, rayWidth * 0.15, rayDist);
        ray *= 1.0 - smoothstep(0.0, u_ray_length * 0.45, dist);

        float brightness = 0.5 + hash(vec2(i * 2.0, 0.0)) * 0.5;
        rays += ray * brightness * 0.25;
    }

    for (float i = 0.0; i < NUM_RAYS * 0.6; i++) {
        float rayAngle = (i - NUM_RAYS * 0.3) / (NUM_RAYS * 0.6) * PI * 0.5;
        rayAngle += PI / (NUM_RAYS * 2.0);
        rayAngle += sin(i * 2.3 + t * 1.5 + 50.0) * u_distortion * 0.3;

        float rayDist = abs(angle - rayAngle);
        float rayWidth = 0.012 * u_spread * 0.4;
        float ray = smoothstep(rayWidth, rayWidth * 0.1, rayDist);
        ray *= (1.0 - smoothstep(0.0, u_ray_length * 0.4, dist)) * 0.4;

        rays += ray * 0.15;
    }

    float cone = 1.0 - smoothstep(0.0, PI * 0.35, abs(angle));
    float coneFade = 1.0 - smoothstep(0.0, u_ray_length * 0.5, dist);
    float softGlow = cone * coneFade * 0.4;
    float sourceGlow = exp(-dist * 5.0) * 0.6;

    float light = rays + softGlow + sourceGlow;

    float luma = dot(u_color, vec3(0.299, 0.587, 0.114));
    vec3 color = mix(vec3(luma), u_color, u_saturation);

    gl_FragColor = vec4(clamp(color * light * 1.8, 0.0, 1.0), clamp(light * 1.2, 0.0, 1.0));
}
"#;

pub const FRAGMENT_SKEW: &str = r#"
precision highp float;

uniform float u_time;
uniform vec2 u_resolution;
uniform vec2 u_pointer;
uniform vec3 u_color;
uniform float u_spread;
uniform float u_ray_length;
uniform float u_distortion;
uniform float u_mouse_influence;
uniform float u_saturation;

#define PI 3.14159265
#define NUM_RAYS 12.0

float random(vec2 st) {
    return fract(sin(dot(st.xy, vec2(12.9898, 78.233))) * 43758.5453);
}

float noise(vec2 st) {
    vec2 i = floor(st);
    vec2 f = fract(st);
    float a = random(i);
    float b = random(i + vec2(1.0, 0.0));
    float c = random(i + vec2(0.0, 1.0));
    float d = random(i + vec2(1.0, 1.0));
    vec2 u = f * f * (3.0 - 2.0 * f);
    return mix(a, b, u.x) + (c - a) * u.y * (1.0 - u.x) + (d - b) * u.x * u.y;
}

float fbm(vec2 p) {
    float v = 0.0;
    float a = 0.5;
    for (int i = 0; i < 4; i++) {
        v += a * noise(p);
        p *= 2.0;
        a *= 0.5;
    }
    return v;
}

void main() {
    vec2 uv = gl_FragCoord.xy / u_resolution;
    float aspect = u_resolution.x / u_resolution.y;

    // shear grows with depth, zero at the top: the origin never moves
    float depth = 1.0 - uv.y;
    uv.x += (0.5 - u_pointer.x) * u_mouse_influence * depth;

    vec2 p = vec2((uv.x - 0.5) * aspect, depth);
    float dist = length(p);
    float angle = atan(p.x, p.y);
    float t = u_time * 0.5;
    float raySum = 0.0;

    for (float i = 0.0; i < NUM_RAYS; i++) {
        float rayAngle = (i / NUM_RAYS - 0.5) * PI * u_spread * 0.25;
        rayAngle += sin(t + i * 2.5) * u_distortion * 1.2;
        rayAngle += fbm(vec2(i * 0.3, t * 0.15)) * u_distortion * 2.0;

        float diff = angle - rayAngle;
        if (diff > PI) diff -= 2.0 * PI;
        if (diff < -PI) diff += 2.0 * PI;

        float rayWidth = 0.05 + random(vec2(i, 0.0)) * 0.02;
        float intensity = exp(-diff * diff / (rayWidth * rayWidth * 2.0));
        float fade = 1.0 - smoothstep(0.0, u_ray_length * 0.22, dist);
        float smoky = 0.6 + fbm(vec2(angle * 2.0 + i, t * 0.2 + dist)) * 0.5;

        raySum += intensity * fade * smoky * 0.12;
    }

    float light = clamp(raySum, 0.0, 0.65);

    float luma = dot(u_color, vec3(0.299, 0.587, 0.114));
    vec3 color = mix(vec3(luma), u_color, u_saturation);

    gl_FragColor = vec4(color, light);
}
"#;

pub fn fragment_source(variant: RayVariant) -> &'static str {
    match variant {
        RayVariant::Cone => FRAGMENT_CONE,
        RayVariant::Skew => FRAGMENT_SKEW,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fragment_declares_the_shared_uniforms() {
        for variant in RayVariant::all() {
            let source = fragment_source(*variant);
            for name in UNIFORM_NAMES {
                assert!(
                    source.contains(&format!(" {name};")),
                    "{:?} fragment is missing {name}",
                    variant
                );
            }
        }
    }

    #[test]
    fn vertex_declares_position() {
        assert!(VERTEX_SHADER.contains(&format!("attribute vec2 {POSITION_ATTRIBUTE};")));
    }

    #[test]
    fn triangle_covers_clip_space() {
        let xs = [FULLSCREEN_TRIANGLE[0], FULLSCREEN_TRIANGLE[2], FULLSCREEN_TRIANGLE[4]];
        let ys = [FULLSCREEN_TRIANGLE[1], FULLSCREEN_TRIANGLE[3], FULLSCREEN_TRIANGLE[5]];
        assert!(xs.iter().cloned().fold(f32::MIN, f32::max) >= 3.0);
        assert!(ys.iter().cloned().fold(f32::MIN, f32::max) >= 3.0);
    }
}
